use crate::foundation::core::ContainerSize;
use crate::foundation::error::{ShunneiError, ShunneiResult};

/// Portrait aspect (width / height) the generation service accepts without distortion.
pub const PORTRAIT_ASPECT: f64 = 3.0 / 4.0;

/// Smallest crop width, as a fraction of the container, a resize may produce.
pub const MIN_CROP_WIDTH: f64 = 0.1;

const INITIAL_CROP_WIDTH: f64 = 0.6;
const INITIAL_CROP_MAX_HEIGHT: f64 = 0.8;
const BOUNDS_EPSILON: f64 = 1e-9;
const ASPECT_TOLERANCE: f64 = 1e-6;

/// How far the user may tilt the photo.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationMode {
    /// ±15°, the fine-tilt slider.
    #[default]
    Fine,
    /// ±45°.
    Wide,
}

impl RotationMode {
    pub fn max_degrees(self) -> f64 {
        match self {
            Self::Fine => 15.0,
            Self::Wide => 45.0,
        }
    }
}

/// Crop rectangle as fractions of the display container, plus the tilt applied to the photo.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation_degrees: f64,
}

impl CropRegion {
    /// The whole container, untilted.
    pub const FULL: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
        rotation_degrees: 0.0,
    };

    /// Width over height measured in container pixels.
    pub fn pixel_aspect(&self, container: ContainerSize) -> f64 {
        (self.width * container.width) / (self.height * container.height)
    }

    /// Check the bounds every render relies on: a non-empty rectangle inside `[0, 1]` and a
    /// rotation no wider than [`RotationMode::Wide`].
    pub fn validate_bounds(&self) -> ShunneiResult<()> {
        let vals = [self.x, self.y, self.width, self.height, self.rotation_degrees];
        if vals.iter().any(|v| !v.is_finite()) {
            return Err(ShunneiError::geometry("crop region contains non-finite values"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(ShunneiError::geometry(format!(
                "crop region must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if self.x < -BOUNDS_EPSILON
            || self.y < -BOUNDS_EPSILON
            || self.x + self.width > 1.0 + BOUNDS_EPSILON
            || self.y + self.height > 1.0 + BOUNDS_EPSILON
        {
            return Err(ShunneiError::geometry(format!(
                "crop region {self:?} exceeds the container"
            )));
        }
        if self.rotation_degrees.abs() > RotationMode::Wide.max_degrees() {
            return Err(ShunneiError::geometry(format!(
                "rotation {}° outside ±{}°",
                self.rotation_degrees,
                RotationMode::Wide.max_degrees()
            )));
        }
        Ok(())
    }
}

/// Mutation boundary for [`CropRegion`]: every edit is clamped into the container and keeps
/// the configured pixel aspect.
#[derive(Clone, Debug, PartialEq)]
pub struct CropEditor {
    container: ContainerSize,
    aspect: f64,
    mode: RotationMode,
    region: CropRegion,
}

impl CropEditor {
    /// Start with the default placement: 60% of the container width, height derived from the
    /// aspect and capped at 80%, centered.
    pub fn new(container: ContainerSize, aspect: f64, mode: RotationMode) -> ShunneiResult<Self> {
        validate_aspect(aspect)?;
        let (cw, ch) = (container.width, container.height);

        let mut width = INITIAL_CROP_WIDTH;
        let mut height = width_to_height(width, container, aspect);
        if height > INITIAL_CROP_MAX_HEIGHT {
            height = INITIAL_CROP_MAX_HEIGHT;
            width = (ch * height * aspect) / cw;
        }
        if width > 1.0 {
            width = 1.0;
            height = width_to_height(width, container, aspect);
        }

        Ok(Self {
            container,
            aspect,
            mode,
            region: CropRegion {
                x: (1.0 - width) / 2.0,
                y: (1.0 - height) / 2.0,
                width,
                height,
                rotation_degrees: 0.0,
            },
        })
    }

    /// Resume editing an existing region; it must already satisfy bounds and aspect.
    pub fn with_region(
        container: ContainerSize,
        aspect: f64,
        mode: RotationMode,
        region: CropRegion,
    ) -> ShunneiResult<Self> {
        validate_aspect(aspect)?;
        region.validate_bounds()?;
        let actual = region.pixel_aspect(container);
        if (actual - aspect).abs() > ASPECT_TOLERANCE * aspect.max(1.0) {
            return Err(ShunneiError::geometry(format!(
                "crop aspect {actual} does not match locked aspect {aspect}"
            )));
        }
        if region.rotation_degrees.abs() > mode.max_degrees() {
            return Err(ShunneiError::geometry(format!(
                "rotation {}° outside ±{}°",
                region.rotation_degrees,
                mode.max_degrees()
            )));
        }
        Ok(Self {
            container,
            aspect,
            mode,
            region,
        })
    }

    pub fn region(&self) -> CropRegion {
        self.region
    }

    pub fn container(&self) -> ContainerSize {
        self.container
    }

    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// Move the rectangle by a container-fraction delta, clamping it inside the container.
    pub fn drag_by(&mut self, dx: f64, dy: f64) {
        let r = &mut self.region;
        r.x = clamp_or_zero(r.x + finite_or_zero(dx), 1.0 - r.width);
        r.y = clamp_or_zero(r.y + finite_or_zero(dy), 1.0 - r.height);
    }

    /// Grow or shrink from the bottom-right handle by `dw` (container fraction of width).
    ///
    /// Height is always derived from width; when the derived size would leave the container,
    /// the offending dimension is pinned to the bound and the other derived back from it.
    pub fn resize_by(&mut self, dw: f64) {
        let container = self.container;
        let aspect = self.aspect;
        let r = &mut self.region;

        let mut width = (r.width + finite_or_zero(dw)).max(MIN_CROP_WIDTH);
        let mut height = width_to_height(width, container, aspect);
        if r.x + width > 1.0 {
            width = 1.0 - r.x;
            height = width_to_height(width, container, aspect);
        }
        if r.y + height > 1.0 {
            height = 1.0 - r.y;
            width = height_to_width(height, container, aspect);
        }

        r.width = width;
        r.height = height;
    }

    /// Set the tilt, clamped to the editor's rotation range.
    pub fn set_rotation(&mut self, degrees: f64) {
        let max = self.mode.max_degrees();
        self.region.rotation_degrees = finite_or_zero(degrees).clamp(-max, max);
    }
}

fn width_to_height(width: f64, container: ContainerSize, aspect: f64) -> f64 {
    (width * container.width / aspect) / container.height
}

fn height_to_width(height: f64, container: ContainerSize, aspect: f64) -> f64 {
    (height * container.height * aspect) / container.width
}

fn validate_aspect(aspect: f64) -> ShunneiResult<()> {
    if !aspect.is_finite() || aspect <= 0.0 {
        return Err(ShunneiError::validation(format!(
            "locked aspect must be positive, got {aspect}"
        )));
    }
    Ok(())
}

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

fn clamp_or_zero(v: f64, max: f64) -> f64 {
    v.clamp(0.0, max.max(0.0))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/crop.rs"]
mod tests;
