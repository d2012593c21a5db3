mod common;

use common::*;
use lopdf::Document;
use pdf_template::*;
use tempfile::{NamedTempFile, TempDir};

fn write_template(path: &std::path::Path, doc: &mut Document) {
    let mut writer = Vec::new();
    doc.save_to(&mut writer).unwrap();
    std::fs::write(path, writer).unwrap();
}

#[tokio::test]
async fn test_load_pdf() {
    let mut doc = text_pdf(&["", "", ""]);
    let temp = NamedTempFile::new().unwrap();
    write_template(temp.path(), &mut doc);

    let loaded = load_pdf(temp.path()).await.unwrap();
    assert_eq!(loaded.get_pages().len(), 3);
}

#[tokio::test]
async fn test_load_missing_file() {
    let result = load_pdf("/nonexistent/template.pdf").await;
    assert!(matches!(result, Err(TemplateError::Io(_))));
}

#[tokio::test]
async fn test_load_corrupt_pdf() {
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"%PDF-1.7\nthis is not a pdf").unwrap();

    let result = load_pdf(temp.path()).await;
    assert!(matches!(result, Err(TemplateError::Decode(_))));
}

#[tokio::test]
async fn test_save_pdf() {
    let doc = text_pdf(&[show_text(10.0, 10.0, "saved")]);
    let temp = NamedTempFile::new().unwrap();

    save_pdf(doc, temp.path()).await.unwrap();

    let loaded = Document::load(temp.path()).unwrap();
    assert_eq!(page_texts(&loaded), vec![vec!["saved".to_string()]]);
}

#[tokio::test]
async fn test_full_run() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("template.pdf");
    let output_path = temp_dir.path().join("filled.pdf");
    let png = write_png(temp_dir.path(), "photo.png", 8, 8, [0, 0, 255]);

    let mut doc = Document::with_version("1.7");
    let photo = add_rgb_image(&mut doc, 4, 4, [255, 255, 255]);
    create_test_pdf(
        &mut doc,
        vec![
            TestPage::new(&format!(
                "{}{}",
                draw_image("Photo", 400.0, 600.0, 100.0, 100.0),
                show_text(72.0, 700.0, "Dear {name},")
            ))
            .with_image("Photo", photo),
            TestPage::new(&show_text(72.0, 700.0, "Ref {id} for {name}")),
        ],
    );
    write_template(&input_path, &mut doc);

    let mut asked = Vec::new();
    let mut values = |marker: &str| {
        asked.push(marker.to_string());
        match marker {
            "name" => Some("Alice".to_string()),
            "id" => Some("42".to_string()),
            _ => None,
        }
    };
    let mut images = |_: usize, _: &layout::ImageRef| ImageDecision::Replace(png.clone());

    let report = run(
        &input_path,
        &output_path,
        &mut values,
        &mut images,
        &TemplateOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(asked, vec!["name", "id"]);
    assert_eq!(report.markers.as_slice(), &["name", "id"]);
    assert_eq!(report.replaced_images(), 1);
    assert!(report.warnings.is_empty());

    let output = load_pdf(&output_path).await.unwrap();
    assert_eq!(
        page_texts(&output),
        vec![vec!["Dear Alice,".to_string()], vec!["Ref 42 for Alice".to_string()]]
    );
    // The template on disk is left alone
    let template = load_pdf(&input_path).await.unwrap();
    assert_eq!(page_texts(&template)[0], vec!["Dear {name},"]);
}

#[tokio::test]
async fn test_run_rejects_invalid_options() {
    let temp_dir = TempDir::new().unwrap();
    let options = TemplateOptions {
        font_size_pt: 0.0,
        ..TemplateOptions::default()
    };

    let result = run(
        temp_dir.path().join("in.pdf"),
        temp_dir.path().join("out.pdf"),
        &mut ValueMap::new(),
        &mut KeepImages,
        &options,
    )
    .await;
    assert!(matches!(result, Err(TemplateError::Config(_))));
    assert!(!temp_dir.path().join("out.pdf").exists());
}

#[tokio::test]
async fn test_run_overwrites_existing_output() {
    let temp_dir = TempDir::new().unwrap();
    let input_path = temp_dir.path().join("template.pdf");
    let output_path = temp_dir.path().join("filled.pdf");
    std::fs::write(&output_path, b"old contents").unwrap();

    let mut doc = text_pdf(&[show_text(72.0, 700.0, "Hi {name}")]);
    write_template(&input_path, &mut doc);

    let mut values: ValueMap = [("name", "Jo")].into_iter().collect();
    run(
        &input_path,
        &output_path,
        &mut values,
        &mut KeepImages,
        &TemplateOptions::default(),
    )
    .await
    .unwrap();

    let output = load_pdf(&output_path).await.unwrap();
    assert_eq!(page_texts(&output), vec![vec!["Hi Jo".to_string()]]);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_value_map_from_json_file() {
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{"name": "Alice", "id": "7"}"#).unwrap();

    let mut values = ValueMap::load(temp.path()).await.unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values.value_for("id").as_deref(), Some("7"));
    assert_eq!(values.value_for("other"), None);
}

#[cfg(feature = "serde")]
#[tokio::test]
async fn test_value_map_rejects_non_string_values() {
    let temp = NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), r#"{"name": 5}"#).unwrap();

    let result = ValueMap::load(temp.path()).await;
    assert!(matches!(result, Err(TemplateError::Config(_))));
}
