//! Resampling primitives shared by the crop transform, the healer and the compositor.
//!
//! All coordinates are continuous pixel coordinates: pixel `(i, j)` covers `[i, i+1) x [j, j+1)`
//! and its center sits at `(i + 0.5, j + 0.5)`. Interpolation happens on premultiplied values
//! so transparent neighbours never bleed their color into an edge.

use crate::foundation::core::{Affine, Bitmap, Point};
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::quantize_u8;

/// Upper bound on supersampling per axis when minifying.
const MAX_SUPERSAMPLE: u32 = 4;

/// Scale ratios this close to 1 are float noise from the crop math, not minification.
const MINIFY_TOLERANCE: f64 = 1e-6;

/// Bilinear sample at continuous coordinate `(x, y)`.
///
/// Points farther than half a pixel outside the bitmap return transparent black; points in the
/// half-pixel border clamp to the edge texels.
pub fn sample_bilinear(src: &Bitmap, x: f64, y: f64) -> [u8; 4] {
    let acc = sample_premul_f64(src, x, y);
    resolve_premul(acc, 1.0)
}

fn sample_premul_f64(src: &Bitmap, x: f64, y: f64) -> [f64; 4] {
    let (w, h) = (f64::from(src.width()), f64::from(src.height()));
    if !(x >= 0.0 && y >= 0.0 && x <= w && y <= h) {
        return [0.0; 4];
    }

    let fx = (x - 0.5).clamp(0.0, w - 1.0);
    let fy = (y - 0.5).clamp(0.0, h - 1.0);
    let x0 = fx.floor() as u32;
    let y0 = fy.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let tx = fx - f64::from(x0);
    let ty = fy - f64::from(y0);

    let taps = [
        (src.pixel(x0, y0), (1.0 - tx) * (1.0 - ty)),
        (src.pixel(x1, y0), tx * (1.0 - ty)),
        (src.pixel(x0, y1), (1.0 - tx) * ty),
        (src.pixel(x1, y1), tx * ty),
    ];

    let mut acc = [0.0f64; 4];
    for (px, wt) in taps {
        if wt == 0.0 {
            continue;
        }
        let a = f64::from(px[3]) / 255.0;
        acc[0] += f64::from(px[0]) * a * wt;
        acc[1] += f64::from(px[1]) * a * wt;
        acc[2] += f64::from(px[2]) * a * wt;
        acc[3] += f64::from(px[3]) * wt;
    }
    acc
}

fn resolve_premul(acc: [f64; 4], count: f64) -> [u8; 4] {
    let alpha = acc[3] / count;
    if quantize_u8(alpha) == 0 {
        return [0, 0, 0, 0];
    }
    let a01 = alpha / 255.0;
    [
        quantize_u8(acc[0] / count / a01),
        quantize_u8(acc[1] / count / a01),
        quantize_u8(acc[2] / count / a01),
        quantize_u8(alpha),
    ]
}

/// Render `src` through `forward` (source pixel space -> output pixel space) into a new
/// `out_w x out_h` bitmap. Output pixels whose preimage misses the source stay transparent.
pub fn warp_affine(src: &Bitmap, forward: Affine, out_w: u32, out_h: u32) -> ShunneiResult<Bitmap> {
    let det = forward.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return Err(ShunneiError::geometry("warp transform is degenerate"));
    }
    let inverse = forward.inverse();
    let n = supersample_factor(inverse);
    let step = 1.0 / f64::from(n);
    let count = f64::from(n * n);

    let mut out = Bitmap::new(out_w, out_h)?;
    for oy in 0..out_h {
        for ox in 0..out_w {
            let mut acc = [0.0f64; 4];
            for sy in 0..n {
                for sx in 0..n {
                    let p = Point::new(
                        f64::from(ox) + (f64::from(sx) + 0.5) * step,
                        f64::from(oy) + (f64::from(sy) + 0.5) * step,
                    );
                    let s = inverse * p;
                    let v = sample_premul_f64(src, s.x, s.y);
                    for c in 0..4 {
                        acc[c] += v[c];
                    }
                }
            }
            out.set_pixel(ox, oy, resolve_premul(acc, count));
        }
    }
    Ok(out)
}

/// How many samples per output axis are needed so minified content does not alias.
fn supersample_factor(inverse: Affine) -> u32 {
    let [a, b, c, d, _, _] = inverse.as_coeffs();
    let sx = (a * a + b * b).sqrt();
    let sy = (c * c + d * d).sqrt();
    let minify = sx.max(sy);
    if !minify.is_finite() || minify <= 1.0 + MINIFY_TOLERANCE {
        return 1;
    }
    (minify.ceil() as u32).clamp(1, MAX_SUPERSAMPLE)
}

/// Stretch `src` to exactly `out_w x out_h`.
pub fn resize(src: &Bitmap, out_w: u32, out_h: u32) -> ShunneiResult<Bitmap> {
    if src.dimensions() == (out_w, out_h) {
        return Ok(src.clone());
    }
    let forward = Affine::scale_non_uniform(
        f64::from(out_w) / f64::from(src.width()),
        f64::from(out_h) / f64::from(src.height()),
    );
    warp_affine(src, forward, out_w, out_h)
}

/// Scale `src` uniformly so it covers `out_w x out_h`, centered, cropping the overflow
/// (CSS `object-fit: cover`).
pub fn cover_fit(src: &Bitmap, out_w: u32, out_h: u32) -> ShunneiResult<Bitmap> {
    let (sw, sh) = (f64::from(src.width()), f64::from(src.height()));
    let (ow, oh) = (f64::from(out_w), f64::from(out_h));
    let scale = (ow / sw).max(oh / sh);
    let forward = Affine::translate(((ow - sw * scale) / 2.0, (oh - sh * scale) / 2.0))
        * Affine::scale(scale);
    warp_affine(src, forward, out_w, out_h)
}

/// Area-average downscale used for analysis buffers.
pub fn downsample_box(src: &Bitmap, out_w: u32, out_h: u32) -> ShunneiResult<Bitmap> {
    let mut out = Bitmap::new(out_w, out_h)?;
    let fx = f64::from(src.width()) / f64::from(out_w);
    let fy = f64::from(src.height()) / f64::from(out_h);

    for oy in 0..out_h {
        let y0 = (f64::from(oy) * fy).floor() as u32;
        let y1 = ((f64::from(oy + 1) * fy).ceil() as u32).clamp(y0 + 1, src.height());
        for ox in 0..out_w {
            let x0 = (f64::from(ox) * fx).floor() as u32;
            let x1 = ((f64::from(ox + 1) * fx).ceil() as u32).clamp(x0 + 1, src.width());
            let mut acc = [0u64; 4];
            let mut n = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let px = src.pixel(x, y);
                    for c in 0..4 {
                        acc[c] += u64::from(px[c]);
                    }
                    n += 1;
                }
            }
            let avg = |v: u64| ((v + n / 2) / n) as u8;
            out.set_pixel(ox, oy, [avg(acc[0]), avg(acc[1]), avg(acc[2]), avg(acc[3])]);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sample.rs"]
mod tests;
