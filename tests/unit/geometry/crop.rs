use super::*;

fn container() -> ContainerSize {
    ContainerSize::new(900.0, 540.0).unwrap()
}

fn assert_locked(editor: &CropEditor) {
    let r = editor.region();
    let aspect = r.pixel_aspect(editor.container());
    assert!(
        (aspect - editor.aspect()).abs() < 1e-9,
        "aspect drifted to {aspect} for {r:?}"
    );
    assert!(r.x >= 0.0 && r.y >= 0.0, "{r:?}");
    assert!(r.x + r.width <= 1.0 + 1e-12, "{r:?}");
    assert!(r.y + r.height <= 1.0 + 1e-12, "{r:?}");
}

// splitmix64, good enough to drive edit sequences deterministically.
struct Seq(u64);

impl Seq {
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    fn delta(&mut self) -> f64 {
        (self.next_f64() - 0.5) * 0.8
    }
}

#[test]
fn initial_region_is_centered_and_capped() {
    let editor = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    let r = editor.region();
    assert!(r.height <= 0.8 + 1e-12);
    assert!((r.x - (1.0 - r.width) / 2.0).abs() < 1e-12);
    assert!((r.y - (1.0 - r.height) / 2.0).abs() < 1e-12);
    assert_locked(&editor);
}

#[test]
fn initial_region_in_tall_container_uses_sixty_percent_width() {
    let tall = ContainerSize::new(300.0, 1000.0).unwrap();
    let editor = CropEditor::new(tall, PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    assert!((editor.region().width - 0.6).abs() < 1e-12);
    assert_locked(&editor);
}

#[test]
fn drag_clamps_inside_container() {
    let mut editor = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    editor.drag_by(5.0, -5.0);
    let r = editor.region();
    assert!((r.x + r.width - 1.0).abs() < 1e-12);
    assert_eq!(r.y, 0.0);
    assert_locked(&editor);
}

#[test]
fn resize_respects_minimum_width() {
    let mut editor = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    editor.resize_by(-10.0);
    assert!((editor.region().width - MIN_CROP_WIDTH).abs() < 1e-12);
    assert_locked(&editor);
}

#[test]
fn resize_pins_to_bounds_without_breaking_aspect() {
    let mut editor = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    editor.resize_by(10.0);
    let r = editor.region();
    assert!(r.x + r.width <= 1.0 + 1e-12);
    assert!((r.y + r.height - 1.0).abs() < 1e-9 || (r.x + r.width - 1.0).abs() < 1e-9);
    assert_locked(&editor);
}

#[test]
fn aspect_lock_survives_random_edit_sequences() {
    for seed in 0..32u64 {
        let mut seq = Seq(seed);
        let c = ContainerSize::new(200.0 + seq.next_f64() * 1200.0, 200.0 + seq.next_f64() * 1200.0)
            .unwrap();
        let mut editor = CropEditor::new(c, PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
        for _ in 0..200 {
            if seq.next_f64() < 0.5 {
                let (dx, dy) = (seq.delta(), seq.delta());
                editor.drag_by(dx, dy);
            } else {
                let dw = seq.delta();
                editor.resize_by(dw);
            }
            assert_locked(&editor);
        }
    }
}

#[test]
fn rotation_is_clamped_per_mode() {
    let mut fine = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Fine).unwrap();
    fine.set_rotation(40.0);
    assert_eq!(fine.region().rotation_degrees, 15.0);

    let mut wide = CropEditor::new(container(), PORTRAIT_ASPECT, RotationMode::Wide).unwrap();
    wide.set_rotation(-60.0);
    assert_eq!(wide.region().rotation_degrees, -45.0);
    wide.set_rotation(f64::NAN);
    assert_eq!(wide.region().rotation_degrees, 0.0);
}

#[test]
fn with_region_rejects_unlocked_aspect() {
    let region = CropRegion {
        x: 0.1,
        y: 0.1,
        width: 0.5,
        height: 0.5,
        rotation_degrees: 0.0,
    };
    let err = CropEditor::with_region(container(), PORTRAIT_ASPECT, RotationMode::Fine, region)
        .unwrap_err();
    assert!(matches!(err, ShunneiError::Geometry(_)));
}

#[test]
fn validate_bounds_rejects_overflowing_regions() {
    let region = CropRegion {
        x: 0.6,
        y: 0.0,
        width: 0.5,
        height: 0.5,
        rotation_degrees: 0.0,
    };
    assert!(region.validate_bounds().is_err());
    assert!(CropRegion::FULL.validate_bounds().is_ok());
}

#[test]
fn region_deserializes_from_camel_case_json() {
    let r: CropRegion =
        serde_json::from_str(r#"{"x":0.15,"y":0.1,"width":0.7,"height":0.8,"rotationDegrees":2.5}"#)
            .unwrap();
    assert_eq!(r.rotation_degrees, 2.5);
    let r: CropRegion = serde_json::from_str(r#"{"x":0,"y":0,"width":1,"height":1}"#).unwrap();
    assert_eq!(r, CropRegion::FULL);
}
