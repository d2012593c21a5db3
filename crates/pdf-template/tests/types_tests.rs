use pdf_template::*;
use std::path::PathBuf;

#[test]
fn test_rect_dimensions() {
    let rect = Rect::new(10.0, 20.0, 110.0, 70.0);
    assert_eq!(rect.width(), 100.0);
    assert_eq!(rect.height(), 50.0);
    assert!(!rect.is_degenerate());
}

#[test]
fn test_rect_degenerate() {
    assert!(Rect::new(10.0, 10.0, 10.0, 50.0).is_degenerate());
    assert!(Rect::new(0.0, 50.0, 10.0, 40.0).is_degenerate());
    assert!(Rect::new(0.0, 0.0, f32::INFINITY, 10.0).is_degenerate());
    assert!(Rect::new(f32::NAN, 0.0, 10.0, 10.0).is_degenerate());
}

#[test]
fn test_rect_from_points_and_union() {
    let rect = Rect::from_points(&[(5.0, 1.0), (-2.0, 8.0), (3.0, 3.0)]).unwrap();
    assert_eq!(rect, Rect::new(-2.0, 1.0, 5.0, 8.0));
    assert!(Rect::from_points(&[]).is_none());

    let union = rect.union(&Rect::new(0.0, 0.0, 1.0, 1.0));
    assert_eq!(union, Rect::new(-2.0, 0.0, 5.0, 8.0));
}

#[test]
fn test_warning_display() {
    let warning = Warning {
        page: 1,
        subject: Subject::Image {
            ordinal: 0,
            name: "Im3".to_string(),
        },
        error: ItemError::MissingResource(PathBuf::from("photo.png")),
    };
    assert_eq!(
        warning.to_string(),
        "page 2, image 1 (/Im3): replacement image not found: photo.png"
    );

    let warning = Warning {
        page: 0,
        subject: Subject::TextBlock { ordinal: 4 },
        error: ItemError::TextOverflow { dropped: 2 },
    };
    assert_eq!(
        warning.to_string(),
        "page 1, text block 5: text does not fit its box, 2 line(s) dropped"
    );

    let warning = Warning {
        page: 2,
        subject: Subject::Form {
            name: "Fm1".to_string(),
        },
        error: ItemError::FormContent("form draws itself".to_string()),
    };
    assert_eq!(
        warning.to_string(),
        "page 3, form /Fm1: form content left out: form draws itself"
    );
    assert_eq!(Subject::InlineImage { ordinal: 0 }.to_string(), "inline image 1");
}

#[test]
fn test_fatal_error_messages() {
    let error = TemplateError::Config("bad".to_string());
    assert_eq!(error.to_string(), "Invalid configuration: bad");

    let error = TemplateError::PageContent {
        page: 2,
        reason: "inline image colorspaces".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Page 2 content could not be parsed: inline image colorspaces"
    );
}
