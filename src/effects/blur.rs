//! Separable gaussian used for the border drop shadow.
//!
//! The shadow caster is always a union of axis-aligned rectangles, so the blur is evaluated per
//! axis on indicator lines instead of on a full raster.

use crate::foundation::error::{ShunneiError, ShunneiResult};

/// Q16 fixed-point weights summing to exactly `1 << 16`.
pub(crate) fn gaussian_kernel_q16(radius: u32, sigma: f64) -> ShunneiResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(ShunneiError::validation("blur sigma must be > 0"));
    }

    let r = radius as i64;
    let denom = 2.0 * sigma * sigma;
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| {
            let x = i as f64;
            (-x * x / denom).exp()
        })
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(ShunneiError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&w| i64::from(w)).sum();
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }
    Ok(weights)
}

/// Canvas-style shadow blur: `sigma = blur / 2`, kernel truncated at three sigma.
pub(crate) fn shadow_kernel(blur: f64) -> ShunneiResult<Vec<u32>> {
    if !blur.is_finite() || blur < 0.0 {
        return Err(ShunneiError::validation(format!(
            "shadow blur must be >= 0, got {blur}"
        )));
    }
    let sigma = blur / 2.0;
    let radius = (sigma * 3.0).ceil() as u32;
    gaussian_kernel_q16(radius, sigma)
}

/// Blur the 1-D indicator of `[start, end)` and sample it at pixel centers `0..len`.
///
/// `start` and `end` may lie outside the line; everything outside the interval is zero.
/// Results are Q16 coverage in `[0, 65536]`.
pub(crate) fn blurred_interval_q16(len: u32, start: i64, end: i64, kernel: &[u32]) -> Vec<u32> {
    let radius = (kernel.len() / 2) as i64;
    (0..i64::from(len))
        .map(|x| {
            let mut acc = 0u64;
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = x + ki as i64 - radius;
                if sx >= start && sx < end {
                    acc += u64::from(kw);
                }
            }
            acc.min(1 << 16) as u32
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
