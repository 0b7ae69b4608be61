//! Approximate facial landmarks from a darkest-region search.
//!
//! This is a heuristic, not a detector: it assumes a near-frontal, centered portrait whose
//! pupils are the darkest spots inside fixed eye windows. Expect errors of a few percent of the
//! face width.

use crate::foundation::core::{Bitmap, Point};
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::luminance_sum;
use crate::geometry::sample::downsample_box;

/// Neighbourhood, in grid cells, used to refine a pupil minimum into a centroid.
const EYE_REFINE_RADIUS: u32 = 3;

/// Located reference coordinate in the analyzed bitmap's pixel space.
pub type AnchorPoint = Point;

/// Landmarks found on one bitmap. A `None` means the search found nothing plausible.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceAnchors {
    pub left_eye: Option<AnchorPoint>,
    pub right_eye: Option<AnchorPoint>,
    pub mouth: Option<AnchorPoint>,
}

impl FaceAnchors {
    pub fn eyes(&self) -> Option<(AnchorPoint, AnchorPoint)> {
        Some((self.left_eye?, self.right_eye?))
    }

    pub fn eye_distance(&self) -> Option<f64> {
        self.eyes().map(|(l, r)| l.distance(r))
    }
}

/// Strategy seam for landmark estimation; a trained model can replace the heuristic here.
pub trait AnchorLocator: Send + Sync {
    fn locate(&self, bitmap: &Bitmap) -> ShunneiResult<FaceAnchors>;
}

/// Search window as fractions of the bitmap, `[x0, x1) x [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SearchBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl SearchBox {
    fn validate(&self, name: &str) -> ShunneiResult<()> {
        let ok = [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite() && (0.0..=1.0).contains(v))
            && self.x0 < self.x1
            && self.y0 < self.y1;
        if !ok {
            return Err(ShunneiError::validation(format!(
                "locator {name} box {self:?} must be a non-empty box inside [0, 1]"
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Analysis buffer size; larger inputs are box-downscaled to it.
    pub analysis_width: u32,
    pub analysis_height: u32,
    /// Image-left eye window.
    pub left_eye: SearchBox,
    /// Image-right eye window.
    pub right_eye: SearchBox,
    /// Mouth window center below the eye midpoint, in eye distances.
    pub mouth_drop: f64,
    /// Mouth window half extents, in eye distances.
    pub mouth_half_width: f64,
    pub mouth_half_height: f64,
    /// How much darker than its window average (RGB sum) a minimum must be to count.
    pub min_contrast: u16,
    /// Pixels below this alpha are ignored (keyed background).
    pub min_alpha: u8,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            analysis_width: 96,
            analysis_height: 128,
            left_eye: SearchBox {
                x0: 0.25,
                y0: 0.25,
                x1: 0.5,
                y1: 0.5,
            },
            right_eye: SearchBox {
                x0: 0.5,
                y0: 0.25,
                x1: 0.75,
                y1: 0.5,
            },
            mouth_drop: 1.2,
            mouth_half_width: 0.6,
            mouth_half_height: 0.35,
            min_contrast: 30,
            min_alpha: 128,
        }
    }
}

impl LocatorConfig {
    pub fn validate(&self) -> ShunneiResult<()> {
        if self.analysis_width == 0 || self.analysis_height == 0 {
            return Err(ShunneiError::validation(
                "locator analysis size must be non-zero",
            ));
        }
        self.left_eye.validate("left_eye")?;
        self.right_eye.validate("right_eye")?;
        let mouth = [self.mouth_drop, self.mouth_half_width, self.mouth_half_height];
        if mouth.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ShunneiError::validation(
                "locator mouth window parameters must be > 0",
            ));
        }
        Ok(())
    }
}

/// Luminance grid of the analysis buffer; `None` marks transparent cells.
struct LumaGrid {
    width: u32,
    height: u32,
    cells: Vec<Option<u16>>,
}

impl LumaGrid {
    fn get(&self, x: u32, y: u32) -> Option<u16> {
        self.cells[(y * self.width + x) as usize]
    }
}

#[derive(Clone, Debug, Default)]
pub struct DarkestRegionLocator {
    config: LocatorConfig,
}

impl DarkestRegionLocator {
    pub fn new(config: LocatorConfig) -> ShunneiResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    fn grid(&self, bitmap: &Bitmap) -> ShunneiResult<LumaGrid> {
        let aw = self.config.analysis_width.min(bitmap.width());
        let ah = self.config.analysis_height.min(bitmap.height());
        let small = if (aw, ah) == bitmap.dimensions() {
            bitmap.clone()
        } else {
            downsample_box(bitmap, aw, ah)?
        };
        let cells = small
            .as_bytes()
            .chunks_exact(4)
            .map(|px| {
                let px = [px[0], px[1], px[2], px[3]];
                (px[3] >= self.config.min_alpha).then(|| luminance_sum(px))
            })
            .collect();
        Ok(LumaGrid {
            width: aw,
            height: ah,
            cells,
        })
    }

    /// Darkest plausible point in grid cells `[x0, x1) x [y0, y1)`, refined to the centroid of
    /// the dark blob within `refine` cells of the minimum. Coordinates are in grid units.
    fn darkest_in(&self, grid: &LumaGrid, window: [u32; 4], refine: u32) -> Option<Point> {
        let [x0, y0, x1, y1] = window;
        let mut sum = 0u64;
        let mut n = 0u64;
        let mut best: Option<(u16, u32, u32)> = None;
        for y in y0..y1 {
            for x in x0..x1 {
                let Some(l) = grid.get(x, y) else { continue };
                sum += u64::from(l);
                n += 1;
                if best.is_none_or(|(bl, _, _)| l < bl) {
                    best = Some((l, x, y));
                }
            }
        }
        let (min, bx, by) = best?;
        let mean = (sum / n) as u16;
        if mean.saturating_sub(min) < self.config.min_contrast {
            return None;
        }

        // Centroid of the dark blob around the minimum, weighted by depth below the midpoint
        // between the minimum and the window mean.
        let cut = min + (mean - min) / 2;
        let (mut wx, mut wy, mut wsum) = (0.0, 0.0, 0.0);
        let lo_x = bx.saturating_sub(refine).max(x0);
        let lo_y = by.saturating_sub(refine).max(y0);
        let hi_x = bx.saturating_add(refine).saturating_add(1).min(x1);
        let hi_y = by.saturating_add(refine).saturating_add(1).min(y1);
        for y in lo_y..hi_y {
            for x in lo_x..hi_x {
                let Some(l) = grid.get(x, y) else { continue };
                if l > cut {
                    continue;
                }
                let w = f64::from(cut - l) + 1.0;
                wx += w * (f64::from(x) + 0.5);
                wy += w * (f64::from(y) + 0.5);
                wsum += w;
            }
        }
        Some(Point::new(wx / wsum, wy / wsum))
    }

    fn search_box(&self, grid: &LumaGrid, b: SearchBox) -> Option<Point> {
        let (gw, gh) = (f64::from(grid.width), f64::from(grid.height));
        let x0 = (b.x0 * gw).floor() as u32;
        let y0 = (b.y0 * gh).floor() as u32;
        let x1 = ((b.x1 * gw).ceil() as u32).clamp(x0 + 1, grid.width);
        let y1 = ((b.y1 * gh).ceil() as u32).clamp(y0 + 1, grid.height);
        self.darkest_in(grid, [x0, y0, x1, y1], EYE_REFINE_RADIUS)
    }

    fn search_mouth(&self, grid: &LumaGrid, left: Point, right: Point) -> Option<Point> {
        let d = left.distance(right);
        let mid = left.midpoint(right);
        let cy = mid.y + d * self.config.mouth_drop;
        let hw = d * self.config.mouth_half_width;
        let hh = d * self.config.mouth_half_height;

        let x0 = (mid.x - hw).floor().max(0.0) as u32;
        let y0 = (cy - hh).floor().max(0.0) as u32;
        let x1 = ((mid.x + hw).ceil().max(0.0) as u32).min(grid.width);
        let y1 = ((cy + hh).ceil().max(0.0) as u32).min(grid.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        // Lips are wide and flat; the whole window is the blob neighbourhood.
        self.darkest_in(grid, [x0, y0, x1, y1], u32::MAX)
    }
}

impl AnchorLocator for DarkestRegionLocator {
    #[tracing::instrument(skip(self, bitmap), fields(w = bitmap.width(), h = bitmap.height()))]
    fn locate(&self, bitmap: &Bitmap) -> ShunneiResult<FaceAnchors> {
        let grid = self.grid(bitmap)?;
        let left = self.search_box(&grid, self.config.left_eye);
        let right = self.search_box(&grid, self.config.right_eye);
        let mouth = match (left, right) {
            (Some(l), Some(r)) => self.search_mouth(&grid, l, r),
            _ => None,
        };

        let sx = f64::from(bitmap.width()) / f64::from(grid.width);
        let sy = f64::from(bitmap.height()) / f64::from(grid.height);
        let to_full = |p: Point| Point::new(p.x * sx, p.y * sy);
        let anchors = FaceAnchors {
            left_eye: left.map(to_full),
            right_eye: right.map(to_full),
            mouth: mouth.map(to_full),
        };
        tracing::debug!(?anchors, "anchors located");
        Ok(anchors)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/face/anchors.rs"]
mod tests;
