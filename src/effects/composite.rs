//! Pixel compositing. Working canvases are premultiplied RGBA8; [`Bitmap`] layers are
//! straight-alpha and premultiplied on the way in.

use crate::foundation::core::Bitmap;
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::{mul_div255_u8, premultiply, unpremultiply};

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over with an extra layer opacity in `0..=255`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: u8) -> PremulRgba8 {
    if opacity == 0 || src[3] == 0 {
        return dst;
    }
    let op = u16::from(opacity);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Premultiplied working surface the compositor draws into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    /// Start from a straight-alpha base layer.
    pub(crate) fn from_bitmap(base: &Bitmap) -> Self {
        let mut data = Vec::with_capacity(base.as_bytes().len());
        for px in base.as_bytes().chunks_exact(4) {
            data.extend_from_slice(&premultiply([px[0], px[1], px[2], px[3]]));
        }
        Self {
            width: base.width(),
            height: base.height(),
            data,
        }
    }

    pub(crate) fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw a same-size straight-alpha layer with source-over.
    pub(crate) fn draw_bitmap(&mut self, layer: &Bitmap, opacity: u8) -> ShunneiResult<()> {
        if layer.dimensions() != self.dimensions() {
            return Err(ShunneiError::render(format!(
                "layer is {}x{}, canvas is {}x{}",
                layer.width(),
                layer.height(),
                self.width,
                self.height
            )));
        }
        for (d, s) in self.data.chunks_exact_mut(4).zip(layer.as_bytes().chunks_exact(4)) {
            let src = premultiply([s[0], s[1], s[2], s[3]]);
            let out = over([d[0], d[1], d[2], d[3]], src, opacity);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Draw a same-size premultiplied buffer, e.g. a `vello_cpu` pixmap.
    pub(crate) fn draw_premul(&mut self, layer: &[u8]) -> ShunneiResult<()> {
        if layer.len() != self.data.len() {
            return Err(ShunneiError::render(
                "premultiplied layer does not match the canvas size",
            ));
        }
        for (d, s) in self.data.chunks_exact_mut(4).zip(layer.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 255);
            d.copy_from_slice(&out);
        }
        Ok(())
    }

    /// Paint `color` (straight alpha) with per-pixel coverage `coverage(x, y)` in `0..=255`.
    pub(crate) fn fill_with_coverage(
        &mut self,
        color: [u8; 4],
        mut coverage: impl FnMut(u32, u32) -> u8,
    ) {
        let src = premultiply(color);
        let w = self.width;
        for (i, d) in self.data.chunks_exact_mut(4).enumerate() {
            let x = (i as u32) % w;
            let y = (i as u32) / w;
            let cov = coverage(x, y);
            if cov == 0 {
                continue;
            }
            let out = over([d[0], d[1], d[2], d[3]], src, cov);
            d.copy_from_slice(&out);
        }
    }

    pub(crate) fn into_bitmap(self) -> ShunneiResult<Bitmap> {
        let mut data = self.data;
        for px in data.chunks_exact_mut(4) {
            let out = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&out);
        }
        Bitmap::from_rgba8(self.width, self.height, data)
    }
}

/// Straight-alpha source-over of `layer` onto a copy of `base`.
///
/// Pixels where `layer` is fully transparent are copied from `base` bit-for-bit.
pub(crate) fn over_straight(base: &Bitmap, layer: &Bitmap) -> ShunneiResult<Bitmap> {
    if layer.dimensions() != base.dimensions() {
        return Err(ShunneiError::render(format!(
            "layer is {}x{}, base is {}x{}",
            layer.width(),
            layer.height(),
            base.width(),
            base.height()
        )));
    }
    let mut out = base.clone();
    for (d, s) in out.as_bytes_mut().chunks_exact_mut(4).zip(layer.as_bytes().chunks_exact(4)) {
        if s[3] == 0 {
            continue;
        }
        let dst = premultiply([d[0], d[1], d[2], d[3]]);
        let src = premultiply([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&unpremultiply(over(dst, src, 255)));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
