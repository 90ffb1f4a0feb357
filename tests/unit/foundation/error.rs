use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BridgeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        BridgeError::channel("x")
            .to_string()
            .contains("channel error:")
    );
    assert!(BridgeError::engine("x").to_string().contains("engine error:"));
    assert!(
        BridgeError::translation("x")
            .to_string()
            .contains("translation error:")
    );
    assert!(
        BridgeError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BridgeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
