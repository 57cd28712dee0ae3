use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReelError::animation("x")
            .to_string()
            .contains("animation error:")
    );
    assert!(
        ReelError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
    assert!(
        ReelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn resource_errors_keep_their_source_id() {
    let err = ResourceLoadError::Decode {
        source_id: "img/logo.png".to_string(),
        message: "bad header".to_string(),
    };
    assert_eq!(err.source_id(), "img/logo.png");

    let wrapped = ReelError::from(err.clone());
    assert_eq!(wrapped.to_string(), err.to_string());
    assert!(wrapped.to_string().contains("bad header"));
}
