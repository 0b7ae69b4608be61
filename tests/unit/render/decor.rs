use super::*;
use crate::foundation::core::Bitmap;

fn white(w: u32, h: u32) -> Canvas {
    Canvas::from_bitmap(&Bitmap::filled(w, h, [255, 255, 255, 255]).unwrap())
}

fn decorate(tier: &TierProfile) -> Bitmap {
    let mut canvas = white(200, 240);
    draw_decoration(&mut canvas, &DecorStyle::default(), tier).unwrap();
    canvas.into_bitmap().unwrap()
}

#[test]
fn border_darkens_edges_and_leaves_center() {
    let out = decorate(&TierProfile::print());
    assert!(out.pixel(0, 120)[0] < 255);
    assert!(out.pixel(100, 0)[0] < 255);
    assert_eq!(out.pixel(100, 120), [255, 255, 255, 255]);
}

#[test]
fn shadow_fades_toward_the_center() {
    let out = decorate(&TierProfile::print());
    let row: Vec<u8> = (10..60).map(|x| out.pixel(x, 120)[0]).collect();
    for pair in row.windows(2) {
        assert!(pair[0] <= pair[1], "{row:?}");
    }
    assert!(row[0] < row[49]);
}

#[test]
fn guide_is_drawn_only_when_requested() {
    let preview = decorate(&TierProfile::preview());
    let no_guide = decorate(&TierProfile {
        safe_area_guide: false,
        ..TierProfile::preview()
    });
    // On the left guide line, inside the first dash.
    let with = preview.pixel(5, 10);
    let without = no_guide.pixel(5, 10);
    assert_ne!(with, without);
    assert!(with[2] > with[0], "{with:?}");
}

#[test]
fn empty_profile_is_a_noop() {
    let tier = TierProfile {
        shadow_blur: 0.0,
        stroke_width: 0.0,
        safe_area_guide: false,
    };
    assert_eq!(decorate(&tier), Bitmap::filled(200, 240, [255, 255, 255, 255]).unwrap());
}

#[test]
fn decoration_is_deterministic() {
    assert_eq!(decorate(&TierProfile::preview()), decorate(&TierProfile::preview()));
}

#[test]
fn guide_dashes_stay_inside_the_inset_rectangle() {
    let style = DecorStyle::default();
    let dashes = guide_dashes(200.0, 240.0, &style);
    assert!(!dashes.is_empty());
    for r in dashes {
        assert!(r.x0 >= 6.0 - 1.0 - 1e-9 && r.x1 <= 194.0 + 1.0 + 1e-9, "{r:?}");
        assert!(r.y0 >= 7.2 - 1.0 - 1e-9 && r.y1 <= 232.8 + 1.0 + 1e-9, "{r:?}");
        assert!(r.width() <= style.guide_dash + 1e-9 || r.height() <= style.guide_dash + 1e-9);
    }
}

#[test]
fn style_and_tier_validation() {
    assert!(DecorStyle {
        guide_inset: 0.6,
        ..DecorStyle::default()
    }
    .validate()
    .is_err());
    assert!(TierProfile {
        stroke_width: -1.0,
        ..TierProfile::print()
    }
    .validate()
    .is_err());
    assert!(TierProfile::preview().validate().is_ok());
}

#[test]
fn guide_pattern_below_half_a_pixel_is_rejected() {
    for (dash, gap) in [(1e-30, 1e-30), (0.4, 6.0), (8.0, 0.0), (f64::NAN, 6.0)] {
        let style = DecorStyle {
            guide_dash: dash,
            guide_gap: gap,
            ..DecorStyle::default()
        };
        assert!(style.validate().is_err(), "dash {dash} gap {gap}");
    }
    let finest = DecorStyle {
        guide_dash: 0.5,
        guide_gap: 0.5,
        ..DecorStyle::default()
    };
    assert!(finest.validate().is_ok());
}

#[test]
fn finest_guide_pattern_terminates() {
    let style = DecorStyle {
        guide_dash: 0.5,
        guide_gap: 0.5,
        ..DecorStyle::default()
    };
    let dashes = guide_dashes(100.0, 100.0, &style);
    assert!(!dashes.is_empty() && dashes.len() < 1000, "{}", dashes.len());
}
