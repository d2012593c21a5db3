mod common;

use common::*;
use lopdf::{Document, ObjectId};
use pdf_template::layout::{ImageRef, scan_document};
use pdf_template::*;
use std::path::PathBuf;
use tempfile::TempDir;

fn logo_page(doc: &mut Document, image: ObjectId) {
    create_test_pdf(
        doc,
        vec![
            TestPage::new(&format!(
                "{}{}",
                draw_image("Logo", 100.0, 600.0, 200.0, 100.0),
                show_text(72.0, 500.0, "Dear {name},")
            ))
            .with_image("Logo", image),
        ],
    );
}

fn replace_all_with(path: PathBuf) -> impl FnMut(usize, &ImageRef) -> ImageDecision {
    move |_: usize, _: &ImageRef| ImageDecision::Replace(path.clone())
}

#[test]
fn test_keep_records_no_substitution() {
    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [1, 2, 3]);
    logo_page(&mut doc, logo);
    let before = doc.get_object(logo).unwrap().as_stream().unwrap().content.clone();

    let (_, images) = extract(&doc).unwrap();
    let (substitutions, warnings) =
        replace(&mut doc, &images, &mut KeepImages, &TemplateOptions::default());

    assert!(warnings.is_empty());
    assert_eq!(substitutions.get(&(0, 0)), Some(&None));
    let after = doc.get_object(logo).unwrap().as_stream().unwrap().content.clone();
    assert_eq!(before, after);
}

#[test]
fn test_raw_image_replaced_with_flate_rgb() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "new.png", 16, 16, [0, 255, 0]);

    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [255, 0, 0]);
    logo_page(&mut doc, logo);

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(png.clone());
    let (substitutions, warnings) =
        replace(&mut doc, &images, &mut source, &TemplateOptions::default());

    assert!(warnings.is_empty());
    assert_eq!(substitutions.get(&(0, 0)), Some(&Some(png)));

    let stream = doc.get_object(logo).unwrap().as_stream().unwrap();
    assert_eq!(stream.dict.get(b"Width").unwrap().as_i64().unwrap(), 4);
    assert_eq!(stream.dict.get(b"Height").unwrap().as_i64().unwrap(), 2);

    let extracted = extract_image(&doc, logo).unwrap();
    assert_eq!(extracted.format, ImageFormat::Png);
    let decoded = image::load_from_memory(&extracted.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (4, 2));
    let [r, g, b] = decoded.get_pixel(0, 0).0;
    assert!(r < 5 && g > 250 && b < 5);
}

#[test]
fn test_jpeg_image_replaced_with_jpeg() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "new.png", 8, 8, [0, 0, 255]);

    let mut doc = Document::with_version("1.7");
    let photo = add_jpeg_image(&mut doc, 10, 6, [255, 255, 0]);
    logo_page(&mut doc, photo);

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(png);
    let (_, warnings) = replace(&mut doc, &images, &mut source, &TemplateOptions::default());
    assert!(warnings.is_empty());

    let extracted = extract_image(&doc, photo).unwrap();
    assert_eq!(extracted.format, ImageFormat::Jpeg);
    let decoded = image::load_from_memory(&extracted.bytes).unwrap().to_rgb8();
    assert_eq!(decoded.dimensions(), (10, 6));
    let [r, g, b] = decoded.get_pixel(5, 3).0;
    assert!(r < 40 && g < 40 && b > 200);
}

#[test]
fn test_missing_file_keeps_original() {
    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [1, 2, 3]);
    logo_page(&mut doc, logo);
    let before = doc.get_object(logo).unwrap().as_stream().unwrap().content.clone();

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(PathBuf::from("/nonexistent/picture.png"));
    let (substitutions, warnings) =
        replace(&mut doc, &images, &mut source, &TemplateOptions::default());

    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0].error, ItemError::MissingResource(_)));
    assert_eq!(substitutions.get(&(0, 0)), Some(&None));
    let after = doc.get_object(logo).unwrap().as_stream().unwrap().content.clone();
    assert_eq!(before, after);
}

#[test]
fn test_undecodable_replacement_is_a_codec_error() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("notes.png");
    std::fs::write(&bogus, b"not an image at all").unwrap();

    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [1, 2, 3]);
    logo_page(&mut doc, logo);

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(bogus);
    let (_, warnings) = replace(&mut doc, &images, &mut source, &TemplateOptions::default());

    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0].error, ItemError::ImageCodec(_)));
}

#[test]
fn test_extraction_failure_skips_replacement() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "new.png", 4, 4, [0, 0, 0]);

    let mut doc = Document::with_version("1.7");
    let broken = add_broken_image(&mut doc);
    logo_page(&mut doc, broken);

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(png);
    let (substitutions, warnings) =
        replace(&mut doc, &images, &mut source, &TemplateOptions::default());

    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0].error, ItemError::Extraction(_)));
    assert_eq!(substitutions.get(&(0, 0)), Some(&None));
}

#[test]
fn test_undrawn_image_is_a_placement_error() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "new.png", 4, 4, [0, 0, 0]);

    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [1, 2, 3]);
    create_test_pdf(
        &mut doc,
        vec![TestPage::new(&show_text(10.0, 10.0, "no drawing")).with_image("Logo", logo)],
    );

    let (_, images) = extract(&doc).unwrap();
    let mut source = replace_all_with(png);
    let (_, warnings) = replace(&mut doc, &images, &mut source, &TemplateOptions::default());

    assert_eq!(warnings.len(), 1);
    assert!(matches!(warnings[0].error, ItemError::PlacementLookup));
}

#[test]
fn test_replacement_shows_up_at_original_rectangle() {
    let dir = TempDir::new().unwrap();
    let png = write_png(dir.path(), "new.png", 30, 30, [0, 255, 0]);

    let mut doc = Document::with_version("1.7");
    let logo = add_rgb_image(&mut doc, 4, 2, [255, 0, 0]);
    logo_page(&mut doc, logo);

    let mut values = |_: &str| Some("Bob".to_string());
    let mut images = |ordinal: usize, image: &ImageRef| {
        assert_eq!(ordinal, 0);
        assert_eq!(image.name, "Logo");
        ImageDecision::Replace(png.clone())
    };
    let (mut output, report) = fill_document(
        &mut doc,
        &mut values,
        &mut images,
        &TemplateOptions::default(),
    )
    .unwrap();
    assert_eq!(report.replaced_images(), 1);
    assert!(report.warnings.is_empty());

    let output = reload(&mut output);
    let layouts = scan_document(&output).unwrap();
    let placed = &layouts[0].images[0];
    assert_eq!(placed.rect, Some(Rect::new(100.0, 600.0, 300.0, 700.0)));
    assert_eq!((placed.width, placed.height), (4, 2));

    let extracted = extract_image(&output, placed.object_id).unwrap();
    let decoded = image::load_from_memory(&extracted.bytes).unwrap().to_rgb8();
    let [r, g, b] = decoded.get_pixel(3, 1).0;
    assert!(r < 5 && g > 250 && b < 5);
    assert_eq!(page_texts(&output), vec![vec!["Dear Bob,".to_string()]]);
}
