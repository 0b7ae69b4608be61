use crate::foundation::core::{Affine, Point, Vec2};

/// Uniform scale, rotation and translation, applied in that order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityTransform {
    pub scale: f64,
    /// Radians, positive turning +x toward +y.
    pub rotation: f64,
    pub translation: Vec2,
}

impl SimilarityTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        rotation: 0.0,
        translation: Vec2::ZERO,
    };

    /// Two-point alignment carrying the `from` eye pair onto the `to` eye pair.
    ///
    /// Returns `None` when either pair is degenerate (coincident points).
    pub fn from_eye_pairs(from: (Point, Point), to: (Point, Point)) -> Option<Self> {
        let from_vec = from.1 - from.0;
        let to_vec = to.1 - to.0;
        let from_len = from_vec.hypot();
        let to_len = to_vec.hypot();
        if !(from_len > 1e-9 && to_len > 1e-9) {
            return None;
        }

        let scale = to_len / from_len;
        let rotation = to_vec.atan2() - from_vec.atan2();
        let linear = Affine::rotate(rotation) * Affine::scale(scale);
        let translation = to.0.midpoint(to.1) - linear * from.0.midpoint(from.1);
        Some(Self {
            scale,
            rotation: normalize_angle(rotation),
            translation,
        })
    }

    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.translation)
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
    }

    pub fn apply(&self, p: Point) -> Point {
        self.to_affine() * p
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.to_degrees()
    }
}

fn normalize_angle(a: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    let r = a.rem_euclid(TAU);
    if r > PI { r - TAU } else { r }
}

#[cfg(test)]
#[path = "../../tests/unit/face/align.rs"]
mod tests;
