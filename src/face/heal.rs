//! Likeness restoration: blend eye and mouth detail from the original photo into the
//! regenerated cutout through a two-anchor similarity alignment.

use crate::effects::composite::over_straight;
use crate::face::align::SimilarityTransform;
use crate::face::anchors::{AnchorLocator, DarkestRegionLocator, FaceAnchors};
use crate::foundation::core::{Bitmap, Point};
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::{mul_div255_u8, quantize_u8};
use crate::geometry::sample::warp_affine;

/// Mask sizes are in eye distances measured on the regenerated image, so the patch follows
/// the subject's scale.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HealConfig {
    pub enabled: bool,
    /// Horizontal semi-axis of each eye disc.
    pub eye_radius: f64,
    /// Vertical over horizontal semi-axis.
    pub eye_aspect: f64,
    pub mouth_radius: f64,
    pub mouth_aspect: f64,
    /// Normalized radius inside which a disc is fully opaque; it fades linearly to zero at 1.
    pub core: f64,
    /// Accepted range for the alignment scale.
    pub min_scale: f64,
    pub max_scale: f64,
    pub max_rotation_degrees: f64,
    /// How far the aligned original mouth may land from the regenerated one.
    pub max_mouth_offset: f64,
}

impl Default for HealConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            eye_radius: 0.4,
            eye_aspect: 0.6,
            mouth_radius: 0.6,
            mouth_aspect: 0.5,
            core: 0.5,
            min_scale: 0.5,
            max_scale: 2.0,
            max_rotation_degrees: 30.0,
            max_mouth_offset: 0.35,
        }
    }
}

impl HealConfig {
    pub fn validate(&self) -> ShunneiResult<()> {
        let positive = [
            ("eye_radius", self.eye_radius),
            ("eye_aspect", self.eye_aspect),
            ("mouth_radius", self.mouth_radius),
            ("mouth_aspect", self.mouth_aspect),
            ("min_scale", self.min_scale),
            ("max_mouth_offset", self.max_mouth_offset),
        ];
        for (name, v) in positive {
            if !v.is_finite() || v <= 0.0 {
                return Err(ShunneiError::validation(format!(
                    "heal {name} must be > 0, got {v}"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.core) {
            return Err(ShunneiError::validation("heal core must lie in [0, 1)"));
        }
        if !(self.max_scale >= self.min_scale) {
            return Err(ShunneiError::validation(
                "heal max_scale must be >= min_scale",
            ));
        }
        if !(0.0..=180.0).contains(&self.max_rotation_degrees) {
            return Err(ShunneiError::validation(
                "heal max_rotation_degrees must lie in [0, 180]",
            ));
        }
        Ok(())
    }
}

/// What a heal call actually did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HealReport {
    pub alignment: Option<SimilarityTransform>,
    pub eyes: bool,
    pub mouth: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HealOutcome {
    pub bitmap: Bitmap,
    pub report: HealReport,
}

#[derive(Clone, Copy, Debug)]
struct Disc {
    center: Point,
    rx: f64,
    ry: f64,
    sin: f64,
    cos: f64,
}

impl Disc {
    fn coverage(&self, p: Point, core: f64) -> f64 {
        let d = p - self.center;
        let u = d.x * self.cos + d.y * self.sin;
        let v = -d.x * self.sin + d.y * self.cos;
        let t = ((u / self.rx).powi(2) + (v / self.ry).powi(2)).sqrt();
        if t >= 1.0 {
            0.0
        } else if t <= core {
            1.0
        } else {
            (1.0 - t) / (1.0 - core)
        }
    }

    /// Pixel bounds `[x0, x1) x [y0, y1)` clipped to `w x h`.
    fn bounds(&self, w: u32, h: u32) -> (u32, u32, u32, u32) {
        let r = self.rx.max(self.ry);
        let clip = |v: f64, max: u32| v.clamp(0.0, f64::from(max)) as u32;
        (
            clip((self.center.x - r).floor(), w),
            clip((self.center.y - r).floor(), h),
            clip((self.center.x + r).ceil(), w),
            clip((self.center.y + r).ceil(), h),
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct RegionHealer<L = DarkestRegionLocator> {
    locator: L,
    config: HealConfig,
}

impl<L: AnchorLocator> RegionHealer<L> {
    pub fn new(locator: L, config: HealConfig) -> ShunneiResult<Self> {
        config.validate()?;
        Ok(Self { locator, config })
    }

    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    /// Locate anchors on both bitmaps and heal `cutout` from `original`.
    #[tracing::instrument(
        skip(self, cutout, original),
        fields(w = cutout.width(), h = cutout.height())
    )]
    pub fn heal(&self, cutout: &Bitmap, original: &Bitmap) -> ShunneiResult<HealOutcome> {
        if !self.config.enabled {
            return Ok(unhealed(cutout));
        }
        let ai = self.locator.locate(cutout)?;
        let orig = self.locator.locate(original)?;
        self.heal_with_anchors(cutout, original, &ai, &orig)
    }

    /// Heal with anchors already located by the caller.
    pub fn heal_with_anchors(
        &self,
        cutout: &Bitmap,
        original: &Bitmap,
        ai: &FaceAnchors,
        orig: &FaceAnchors,
    ) -> ShunneiResult<HealOutcome> {
        let (Some(ai_eyes), Some(orig_eyes)) = (ai.eyes(), orig.eyes()) else {
            tracing::debug!(?ai, ?orig, "eye pair missing, heal skipped");
            return Ok(unhealed(cutout));
        };
        let Some(align) = SimilarityTransform::from_eye_pairs(orig_eyes, ai_eyes) else {
            tracing::debug!("degenerate eye pair, heal skipped");
            return Ok(unhealed(cutout));
        };
        if !self.plausible(&align) {
            tracing::debug!(
                scale = align.scale,
                rotation = align.rotation_degrees(),
                "implausible alignment, heal skipped"
            );
            return Ok(HealOutcome {
                bitmap: cutout.clone(),
                report: HealReport {
                    alignment: Some(align),
                    ..HealReport::default()
                },
            });
        }

        let d = ai_eyes.0.distance(ai_eyes.1);
        let eye_line = ai_eyes.1 - ai_eyes.0;
        let angle = eye_line.atan2();
        let (sin, cos) = angle.sin_cos();
        let disc = |center: Point, radius: f64, aspect: f64| Disc {
            center,
            rx: radius * d,
            ry: radius * d * aspect,
            sin,
            cos,
        };

        let mut discs = vec![
            disc(ai_eyes.0, self.config.eye_radius, self.config.eye_aspect),
            disc(ai_eyes.1, self.config.eye_radius, self.config.eye_aspect),
        ];
        let mouth = match (ai.mouth, orig.mouth) {
            (Some(ai_m), Some(orig_m)) => {
                let offset = align.apply(orig_m).distance(ai_m);
                if offset <= self.config.max_mouth_offset * d {
                    discs.push(disc(ai_m, self.config.mouth_radius, self.config.mouth_aspect));
                    true
                } else {
                    tracing::debug!(offset, "mouth anchors disagree, mouth heal skipped");
                    false
                }
            }
            _ => {
                tracing::debug!("mouth anchor missing, mouth heal skipped");
                false
            }
        };

        let warped = warp_affine(original, align.to_affine(), cutout.width(), cutout.height())?;
        let patch = self.masked_patch(cutout, &warped, &discs)?;
        Ok(HealOutcome {
            bitmap: over_straight(cutout, &patch)?,
            report: HealReport {
                alignment: Some(align),
                eyes: true,
                mouth,
            },
        })
    }

    fn plausible(&self, align: &SimilarityTransform) -> bool {
        (self.config.min_scale..=self.config.max_scale).contains(&align.scale)
            && align.rotation_degrees().abs() <= self.config.max_rotation_degrees
    }

    /// The warped original restricted to the union of `discs` and to the cutout's own alpha,
    /// so the silhouette never grows.
    fn masked_patch(
        &self,
        cutout: &Bitmap,
        warped: &Bitmap,
        discs: &[Disc],
    ) -> ShunneiResult<Bitmap> {
        let (w, h) = cutout.dimensions();
        let mut patch = Bitmap::new(w, h)?;
        for disc in discs {
            let (x0, y0, x1, y1) = disc.bounds(w, h);
            for y in y0..y1 {
                for x in x0..x1 {
                    let p = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                    let mask = discs
                        .iter()
                        .map(|d| d.coverage(p, self.config.core))
                        .fold(0.0, f64::max);
                    if mask <= 0.0 {
                        continue;
                    }
                    let src = warped.pixel(x, y);
                    let limit = mul_div255_u8(u16::from(src[3]), u16::from(cutout.pixel(x, y)[3]));
                    let alpha = quantize_u8(f64::from(limit) * mask);
                    patch.set_pixel(x, y, [src[0], src[1], src[2], alpha]);
                }
            }
        }
        Ok(patch)
    }
}

fn unhealed(cutout: &Bitmap) -> HealOutcome {
    HealOutcome {
        bitmap: cutout.clone(),
        report: HealReport::default(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/face/heal.rs"]
mod tests;
