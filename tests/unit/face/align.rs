use super::*;

fn known() -> SimilarityTransform {
    SimilarityTransform {
        scale: 1.3,
        rotation: 10f64.to_radians(),
        translation: Vec2::new(12.0, -7.0),
    }
}

#[test]
fn recovers_known_parameters_from_eye_pairs() {
    let t = known();
    let from = (Point::new(40.0, 50.0), Point::new(80.0, 52.0));
    let to = (t.apply(from.0), t.apply(from.1));
    let got = SimilarityTransform::from_eye_pairs(from, to).unwrap();
    assert!((got.scale - 1.3).abs() < 1e-9);
    assert!((got.rotation_degrees() - 10.0).abs() < 1e-9);
    assert!((got.translation - t.translation).hypot() < 1e-9);
}

#[test]
fn maps_eyes_exactly() {
    let from = (Point::new(10.0, 10.0), Point::new(30.0, 14.0));
    let to = (Point::new(200.0, 300.0), Point::new(260.0, 290.0));
    let t = SimilarityTransform::from_eye_pairs(from, to).unwrap();
    assert!(t.apply(from.0).distance(to.0) < 1e-9);
    assert!(t.apply(from.1).distance(to.1) < 1e-9);
}

#[test]
fn identical_pairs_give_identity() {
    let pair = (Point::new(3.0, 4.0), Point::new(9.0, 4.0));
    let t = SimilarityTransform::from_eye_pairs(pair, pair).unwrap();
    assert!((t.scale - 1.0).abs() < 1e-12);
    assert!(t.rotation.abs() < 1e-12);
    assert!(t.translation.hypot() < 1e-12);
}

#[test]
fn rotation_is_normalized_across_the_branch_cut() {
    let from = (Point::new(0.0, 0.0), Point::new(-10.0, 1.0));
    let to = (Point::new(0.0, 0.0), Point::new(-10.0, -1.0));
    let t = SimilarityTransform::from_eye_pairs(from, to).unwrap();
    assert!(t.rotation.abs() < 0.3, "{}", t.rotation);
}

#[test]
fn coincident_eyes_are_rejected() {
    let p = Point::new(5.0, 5.0);
    assert!(SimilarityTransform::from_eye_pairs((p, p), (p, Point::new(6.0, 5.0))).is_none());
}
