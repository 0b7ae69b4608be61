use super::*;

fn photo(w: u32, h: u32) -> Bitmap {
    let mut b = Bitmap::new(w, h).unwrap();
    for y in 0..h {
        for x in 0..w {
            b.set_pixel(x, y, [(x % 256) as u8, (y % 256) as u8, 128, 255]);
        }
    }
    b
}

fn quiet_config() -> EngineConfig {
    let flat = crate::render::decor::TierProfile {
        shadow_blur: 0.0,
        stroke_width: 0.0,
        safe_area_guide: false,
    };
    EngineConfig {
        preview: flat.clone(),
        print: flat,
        ..EngineConfig::default()
    }
}

fn spec<'a>(
    source: SourceLayer<'a>,
    fg: Option<&'a Bitmap>,
    bg: BackgroundChoice,
) -> CompositeSpec<'a> {
    CompositeSpec {
        source,
        foreground: fg,
        background: bg,
        output_width: 60,
        output_height: 80,
        tier: ResolutionTier::Preview,
    }
}

#[test]
fn tier_sizes() {
    assert_eq!(ResolutionTier::Preview.default_size(), (800, 1067));
    assert_eq!(ResolutionTier::Print.default_size(), (2700, 3600));
}

#[test]
fn at_tier_rescales_the_same_inputs() {
    let src = photo(30, 40);
    let s = spec(SourceLayer::Cropped(&src), None, BackgroundChoice::Blue)
        .at_tier(ResolutionTier::Print);
    assert_eq!((s.output_width, s.output_height), (2700, 3600));
    assert_eq!(s.tier, ResolutionTier::Print);
    assert_eq!(s.background, BackgroundChoice::Blue);
}

#[test]
fn synthesized_background_without_foreground() {
    let src = photo(30, 40);
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let out = r
        .render(&spec(SourceLayer::Cropped(&src), None, BackgroundChoice::White))
        .unwrap();
    assert!(out.as_bytes().iter().all(|&v| v == 255));
}

#[test]
fn none_background_is_the_cropped_photo() {
    let src = photo(60, 80);
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let out = r
        .render(&spec(SourceLayer::Cropped(&src), None, BackgroundChoice::None))
        .unwrap();
    assert_eq!(out, src);
}

#[test]
fn all_key_foreground_shows_only_background() {
    let src = photo(60, 80);
    let fg = Bitmap::filled(30, 40, [0, 255, 0, 255]).unwrap();
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let with_fg = r
        .render(&spec(SourceLayer::Cropped(&src), Some(&fg), BackgroundChoice::Gray))
        .unwrap();
    let without = r
        .render(&spec(SourceLayer::Cropped(&src), None, BackgroundChoice::Gray))
        .unwrap();
    assert_eq!(with_fg, without);
}

#[test]
fn opaque_foreground_covers_background() {
    let src = photo(60, 80);
    let fg = Bitmap::filled(60, 80, [200, 40, 40, 255]).unwrap();
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let out = r
        .render(&spec(SourceLayer::Cropped(&src), Some(&fg), BackgroundChoice::White))
        .unwrap();
    assert_eq!(out.pixel(30, 40), [200, 40, 40, 255]);
}

#[test]
fn mismatched_foreground_aspect_is_rejected() {
    let src = photo(60, 80);
    let fg = Bitmap::filled(80, 80, [0, 255, 0, 255]).unwrap();
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let err = r
        .render(&spec(SourceLayer::Cropped(&src), Some(&fg), BackgroundChoice::White))
        .unwrap_err();
    assert!(matches!(err, ShunneiError::Foreground(_)));
}

#[test]
fn foreground_within_tolerance_is_accepted() {
    assert!(validate_foreground(&Bitmap::new(300, 400).unwrap(), 60, 80).is_ok());
    assert!(validate_foreground(&Bitmap::new(303, 400).unwrap(), 60, 80).is_ok());
    assert!(validate_foreground(&Bitmap::new(320, 400).unwrap(), 60, 80).is_err());
}

#[test]
fn zero_output_is_a_validation_error() {
    let src = photo(10, 10);
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let mut s = spec(SourceLayer::Cropped(&src), None, BackgroundChoice::White);
    s.output_width = 0;
    assert!(matches!(r.render(&s).unwrap_err(), ShunneiError::Validation(_)));
}

#[test]
fn out_of_bounds_crop_is_a_geometry_error() {
    let src = photo(40, 40);
    let r = CompositeRenderer::new(quiet_config()).unwrap();
    let crop = SourceCrop {
        source: &src,
        container: ContainerSize::new(100.0, 100.0).unwrap(),
        region: CropRegion {
            x: 0.8,
            y: 0.0,
            width: 0.5,
            height: 0.5,
            rotation_degrees: 0.0,
        },
    };
    let err = r
        .render(&spec(SourceLayer::Crop(crop), None, BackgroundChoice::None))
        .unwrap_err();
    assert!(matches!(err, ShunneiError::Geometry(_)));
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut cfg = EngineConfig::default();
    cfg.chroma.high_threshold = cfg.chroma.low_threshold;
    assert!(CompositeRenderer::new(cfg).is_err());
}

#[test]
fn preview_decoration_changes_the_border_only() {
    let src = photo(60, 80);
    let decorated = CompositeRenderer::new(EngineConfig::default())
        .unwrap()
        .render(&spec(SourceLayer::Cropped(&src), None, BackgroundChoice::White))
        .unwrap();
    assert_ne!(decorated.pixel(0, 40), [255, 255, 255, 255]);
    assert_eq!(decorated.pixel(30, 40), [255, 255, 255, 255]);
}
