use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ShunneiError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ShunneiError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(ShunneiError::decode("x").to_string().contains("decode error:"));
    assert!(
        ShunneiError::foreground("x")
            .to_string()
            .contains("foreground error:")
    );
    assert!(ShunneiError::render("x").to_string().contains("render error:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ShunneiError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
