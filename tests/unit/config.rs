use super::*;

#[test]
fn defaults_carry_tuned_constants() {
    let cfg = EngineConfig::default();
    assert_eq!(cfg.chroma.low_threshold, 10);
    assert_eq!(cfg.chroma.high_threshold, 45);
    assert_eq!(cfg.chroma.falloff_exponent, 1.0);
    assert_eq!(cfg.preview.shadow_blur, 10.0);
    assert_eq!(cfg.preview.stroke_width, 4.0);
    assert!(cfg.preview.safe_area_guide);
    assert_eq!(cfg.print.shadow_blur, 60.0);
    assert_eq!(cfg.print.stroke_width, 20.0);
    assert!(!cfg.print.safe_area_guide);
    assert!(cfg.validate().is_ok());
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let cfg = EngineConfig::from_json_str(r#"{"chroma": {"low_threshold": 5}}"#).unwrap();
    assert_eq!(cfg.chroma.low_threshold, 5);
    assert_eq!(cfg.chroma.high_threshold, 45);
    assert_eq!(cfg.print, TierProfile::print());
}

#[test]
fn tier_override_replaces_the_whole_profile() {
    let cfg = EngineConfig::from_json_str(
        r#"{"print": {"shadow_blur": 40, "stroke_width": 12, "safe_area_guide": false}}"#,
    )
    .unwrap();
    assert_eq!(cfg.tier_profile(ResolutionTier::Print).stroke_width, 12.0);
    assert_eq!(cfg.tier_profile(ResolutionTier::Preview), &TierProfile::preview());

    let partial = EngineConfig::from_json_str(r#"{"print": {"shadow_blur": 40}}"#);
    assert!(matches!(partial.unwrap_err(), ShunneiError::Validation(_)));
}

#[test]
fn inconsistent_values_are_rejected() {
    let err = EngineConfig::from_json_str(r#"{"chroma": {"low_threshold": 50}}"#).unwrap_err();
    assert!(err.to_string().starts_with("validation error:"), "{err}");
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ShunneiError::Other(_)));
    assert!(format!("{err:#}").contains("/definitely/not/here.json"));
}

#[test]
fn vanishing_guide_dash_is_rejected() {
    let json = r#"{"decor": {"guide_dash": 1e-30, "guide_gap": 1e-30}}"#;
    let err = EngineConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, ShunneiError::Validation(_)), "{err}");
}
