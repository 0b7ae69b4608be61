use crate::foundation::core::{Affine, Bitmap, ContainerSize, Rect, Vec2};
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::geometry::crop::CropRegion;
use crate::geometry::sample::warp_affine;

/// Placement of a source image shown "fit without cropping" (CSS `object-fit: contain`)
/// inside its container, in container pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitLayout {
    pub visual_width: f64,
    pub visual_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl FitLayout {
    pub fn contain(natural_width: u32, natural_height: u32, container: ContainerSize) -> Self {
        let image_aspect = f64::from(natural_width) / f64::from(natural_height);
        if image_aspect > container.aspect() {
            let visual_height = container.width / image_aspect;
            Self {
                visual_width: container.width,
                visual_height,
                offset_x: 0.0,
                offset_y: (container.height - visual_height) / 2.0,
            }
        } else {
            let visual_width = container.height * image_aspect;
            Self {
                visual_width,
                visual_height: container.height,
                offset_x: (container.width - visual_width) / 2.0,
                offset_y: 0.0,
            }
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.offset_x + self.visual_width / 2.0,
            self.offset_y + self.visual_height / 2.0,
        )
    }
}

/// Maps a container-space crop (plus tilt) onto source pixels.
///
/// The tilt pivots on the crop center: the output is centered, rotated, and the source is drawn
/// shifted by [`CropTransform::center_delta`] inside the rotated frame. Everything stays in `f64`
/// until a bitmap is allocated.
#[derive(Clone, Debug, PartialEq)]
pub struct CropTransform {
    natural_width: u32,
    natural_height: u32,
    layout: FitLayout,
    crop_px: Rect,
    scale: f64,
    rotation_rad: f64,
}

impl CropTransform {
    pub fn new(
        natural_width: u32,
        natural_height: u32,
        container: ContainerSize,
        region: &CropRegion,
    ) -> ShunneiResult<Self> {
        if natural_width == 0 || natural_height == 0 {
            return Err(ShunneiError::geometry("source image has zero size"));
        }
        region.validate_bounds()?;

        let layout = FitLayout::contain(natural_width, natural_height, container);
        let crop_px = Rect::new(
            region.x * container.width,
            region.y * container.height,
            (region.x + region.width) * container.width,
            (region.y + region.height) * container.height,
        );

        Ok(Self {
            natural_width,
            natural_height,
            layout,
            crop_px,
            scale: f64::from(natural_width) / layout.visual_width,
            rotation_rad: region.rotation_degrees.to_radians(),
        })
    }

    pub fn layout(&self) -> FitLayout {
        self.layout
    }

    /// Source pixels per container pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Crop size in source pixels, unrounded.
    pub fn crop_size_source(&self) -> (f64, f64) {
        (
            self.crop_px.width() * self.scale,
            self.crop_px.height() * self.scale,
        )
    }

    /// Crop size in source pixels, rounded for allocation: the full-resolution output size.
    pub fn native_size(&self) -> (u32, u32) {
        let (w, h) = self.crop_size_source();
        (w.round().max(1.0) as u32, h.round().max(1.0) as u32)
    }

    /// Offset from the crop center to the source center, in source pixels.
    pub fn center_delta(&self) -> Vec2 {
        (self.layout.center() - self.crop_px.center().to_vec2()) * self.scale
    }

    /// Source pixel space -> output pixel space for an `out_w x out_h` result.
    pub fn source_to_output(&self, out_w: u32, out_h: u32) -> Affine {
        let (crop_w, crop_h) = self.crop_size_source();
        let source_center = Vec2::new(
            f64::from(self.natural_width) / 2.0,
            f64::from(self.natural_height) / 2.0,
        );

        Affine::scale_non_uniform(f64::from(out_w) / crop_w, f64::from(out_h) / crop_h)
            * Affine::translate((crop_w / 2.0, crop_h / 2.0))
            * Affine::rotate(self.rotation_rad)
            * Affine::translate(self.center_delta() - source_center)
    }

    /// Produce the cropped, rotated bitmap at `out_w x out_h`, sampled from full-resolution
    /// source pixels.
    #[tracing::instrument(
        skip(self, source),
        fields(src_w = source.width(), src_h = source.height())
    )]
    pub fn render(&self, source: &Bitmap, out_w: u32, out_h: u32) -> ShunneiResult<Bitmap> {
        if source.dimensions() != (self.natural_width, self.natural_height) {
            return Err(ShunneiError::geometry(format!(
                "source is {}x{}, transform was built for {}x{}",
                source.width(),
                source.height(),
                self.natural_width,
                self.natural_height
            )));
        }
        warp_affine(source, self.source_to_output(out_w, out_h), out_w, out_h)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/transform.rs"]
mod tests;
