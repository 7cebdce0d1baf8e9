use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramefxError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FramefxError::surface("x")
            .to_string()
            .contains("surface error:")
    );
    assert!(
        FramefxError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        FramefxError::preset("x")
            .to_string()
            .contains("preset error:")
    );
    assert!(
        FramefxError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn export_frame_carries_index_and_cause() {
    let err = FramefxError::export_frame(17, FramefxError::render("pixmap size mismatch"));
    assert_eq!(err.failed_frame(), Some(17));
    let msg = err.to_string();
    assert!(msg.contains("frame 17"));
    assert!(msg.contains("pixmap size mismatch"));

    assert_eq!(FramefxError::render("x").failed_frame(), None);
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramefxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
