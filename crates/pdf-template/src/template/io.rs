//! Document I/O for template runs

use crate::types::*;
use lopdf::Document;
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    log::debug!(
        "Loaded {} ({} page(s))",
        path.display(),
        doc.get_pages().len()
    );
    Ok(doc)
}

/// Serialize a document to PDF bytes
pub fn write_pdf(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)
        .map_err(|e| TemplateError::Encode(e.to_string()))?;
    Ok(writer)
}

/// Save a filled document, replacing any existing file
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || write_pdf(&mut doc)).await??;
    tokio::fs::write(&path, bytes).await?;
    log::debug!("Wrote {}", path.display());
    Ok(())
}
