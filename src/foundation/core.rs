use crate::foundation::error::{ShunneiError, ShunneiResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Largest edge accepted for any bitmap the engine allocates.
///
/// Decoration is rasterized on `vello_cpu` surfaces, which address pixels with `u16`.
pub const MAX_DIMENSION: u32 = u16::MAX as u32;

/// Straight-alpha RGBA8 raster, row-major, tightly packed.
///
/// The buffer length always equals `width * height * 4`. A bitmap is owned by the stage that
/// produced it; stages read their inputs by reference and return freshly allocated outputs.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> ShunneiResult<Self> {
        Self::filled(width, height, [0, 0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> ShunneiResult<Self> {
        let len = buffer_len(width, height)?;
        let data = rgba.repeat(len / 4);
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Wrap an existing straight-alpha RGBA8 buffer.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> ShunneiResult<Self> {
        let len = buffer_len(width, height)?;
        if data.len() != len {
            return Err(ShunneiError::decode(format!(
                "rgba8 buffer has {} bytes, expected {len} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`. Panics when out of bounds, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Overwrite the pixel at `(x, y)`. Panics when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = self.index(x, y);
        self.data[idx..idx + 4].copy_from_slice(&rgba);
    }

    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{}",
            self.width,
            self.height
        );
        ((y as usize) * (self.width as usize) + (x as usize)) * 4
    }
}

fn buffer_len(width: u32, height: u32) -> ShunneiResult<usize> {
    if width == 0 || height == 0 {
        return Err(ShunneiError::validation(format!(
            "bitmap dimensions must be non-zero, got {width}x{height}"
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ShunneiError::validation(format!(
            "bitmap dimensions {width}x{height} exceed {MAX_DIMENSION}"
        )));
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| ShunneiError::validation("bitmap buffer size overflow"))
}

/// Container size in which the source image is displayed while the crop is edited.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

impl ContainerSize {
    pub fn new(width: f64, height: f64) -> ShunneiResult<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(ShunneiError::geometry(format!(
                "container size must be positive, got {width}x{height}"
            )));
        }
        Ok(Self { width, height })
    }

    pub fn aspect(self) -> f64 {
        self.width / self.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
