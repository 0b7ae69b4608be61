//! Bitmap decode/encode at the crate boundary. Orientation correction and exotic formats are
//! the ingestion layer's job; anything `image` can read is accepted here.

use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use crate::foundation::core::{Bitmap, MAX_DIMENSION};
use crate::foundation::error::{ShunneiError, ShunneiResult};

pub fn decode_image(bytes: &[u8]) -> ShunneiResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| ShunneiError::decode(format!("decode image from memory: {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ShunneiError::decode(format!(
            "image {width}x{height} exceeds {MAX_DIMENSION} pixels per edge"
        )));
    }
    Bitmap::from_rgba8(width, height, rgba.into_raw())
}

pub fn load_image(path: impl AsRef<Path>) -> ShunneiResult<Bitmap> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
        .map_err(|e| ShunneiError::decode(format!("{}: {e}", path.display())))
}

pub fn encode_png(bitmap: &Bitmap) -> ShunneiResult<Vec<u8>> {
    let mut buf = Vec::new();
    image::write_buffer_with_format(
        &mut Cursor::new(&mut buf),
        bitmap.as_bytes(),
        bitmap.width(),
        bitmap.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .context("encode png")?;
    Ok(buf)
}

pub fn save_png(bitmap: &Bitmap, path: impl AsRef<Path>) -> ShunneiResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        bitmap.as_bytes(),
        bitmap.width(),
        bitmap.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
