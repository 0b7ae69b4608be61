//! Border decoration (drop shadow + thin stroke) and the preview-only safe-area guide.
//!
//! The shadow is evaluated analytically from separable gaussian profiles and is exact for a
//! given input. Stroke and guide edges are anti-aliased by `vello_cpu`; fractional edges may
//! differ by a few levels across `vello_cpu` releases or SIMD levels, which is the documented
//! tolerance on render determinism. Whole-pixel edges are exact.

use crate::effects::blur::{blurred_interval_q16, shadow_kernel};
use crate::effects::composite::Canvas;
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::quantize_u8;

/// Shortest dash or gap the guide pattern accepts, in output pixels.
const MIN_GUIDE_SEGMENT: f64 = 0.5;

/// Per-tier decoration sizes, in output pixels.
///
/// Tier profiles are replaced as a whole when overridden from JSON.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TierProfile {
    /// Canvas-style shadow blur; the gaussian sigma is half of it.
    pub shadow_blur: f64,
    /// Stroke centered on the canvas edge; half of it lands inside the canvas.
    pub stroke_width: f64,
    pub safe_area_guide: bool,
}

impl TierProfile {
    pub fn preview() -> Self {
        Self {
            shadow_blur: 10.0,
            stroke_width: 4.0,
            safe_area_guide: true,
        }
    }

    pub fn print() -> Self {
        Self {
            shadow_blur: 60.0,
            stroke_width: 20.0,
            safe_area_guide: false,
        }
    }

    pub fn validate(&self) -> ShunneiResult<()> {
        if !self.shadow_blur.is_finite() || self.shadow_blur < 0.0 {
            return Err(ShunneiError::validation("tier shadow_blur must be >= 0"));
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(ShunneiError::validation("tier stroke_width must be >= 0"));
        }
        Ok(())
    }
}

/// Colors and guide geometry shared by every tier.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DecorStyle {
    pub shadow_color: [u8; 4],
    pub stroke_color: [u8; 4],
    /// Guide inset as a fraction of each dimension.
    pub guide_inset: f64,
    pub guide_color: [u8; 4],
    pub guide_width: f64,
    pub guide_dash: f64,
    pub guide_gap: f64,
}

impl Default for DecorStyle {
    fn default() -> Self {
        Self {
            shadow_color: [0, 0, 0, 26],
            stroke_color: [0, 0, 0, 13],
            guide_inset: 0.03,
            guide_color: [59, 130, 246, 180],
            guide_width: 2.0,
            guide_dash: 8.0,
            guide_gap: 6.0,
        }
    }
}

impl DecorStyle {
    pub fn validate(&self) -> ShunneiResult<()> {
        if !(0.0..0.5).contains(&self.guide_inset) {
            return Err(ShunneiError::validation("guide_inset must lie in [0, 0.5)"));
        }
        if !self.guide_width.is_finite() || self.guide_width <= 0.0 {
            return Err(ShunneiError::validation("guide_width must be > 0"));
        }
        let pattern = [self.guide_dash, self.guide_gap];
        if pattern.iter().any(|v| !v.is_finite() || *v < MIN_GUIDE_SEGMENT) {
            return Err(ShunneiError::validation(format!(
                "guide dash and gap must be at least {MIN_GUIDE_SEGMENT}px"
            )));
        }
        Ok(())
    }
}

pub(crate) fn draw_decoration(
    canvas: &mut Canvas,
    style: &DecorStyle,
    tier: &TierProfile,
) -> ShunneiResult<()> {
    draw_shadow(canvas, style, tier)?;
    draw_vector_layer(canvas, style, tier)
}

/// Shadow cast by the stroke band: blur(outer rect) - blur(inner rect), both separable.
fn draw_shadow(canvas: &mut Canvas, style: &DecorStyle, tier: &TierProfile) -> ShunneiResult<()> {
    if tier.stroke_width <= 0.0 || style.shadow_color[3] == 0 {
        return Ok(());
    }
    let (w, h) = canvas.dimensions();
    let band = (tier.stroke_width / 2.0).round() as i64;
    if band == 0 {
        return Ok(());
    }
    let kernel = shadow_kernel(tier.shadow_blur)?;
    let (wi, hi) = (i64::from(w), i64::from(h));
    let outer_x = blurred_interval_q16(w, -band, wi + band, &kernel);
    let outer_y = blurred_interval_q16(h, -band, hi + band, &kernel);
    let inner_x = blurred_interval_q16(w, band, wi - band, &kernel);
    let inner_y = blurred_interval_q16(h, band, hi - band, &kernel);

    let alpha = f64::from(style.shadow_color[3]);
    let color = [style.shadow_color[0], style.shadow_color[1], style.shadow_color[2], 255];
    let q32 = f64::from(1u32 << 16).powi(2);
    canvas.fill_with_coverage(color, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let outer = u64::from(outer_x[x]) * u64::from(outer_y[y]);
        let inner = u64::from(inner_x[x]) * u64::from(inner_y[y]);
        let cov = outer.saturating_sub(inner) as f64 / q32;
        quantize_u8(alpha * cov.min(1.0))
    });
    Ok(())
}

fn draw_vector_layer(
    canvas: &mut Canvas,
    style: &DecorStyle,
    tier: &TierProfile,
) -> ShunneiResult<()> {
    let band = tier.stroke_width / 2.0;
    if band <= 0.0 && !tier.safe_area_guide {
        return Ok(());
    }
    let (w, h) = canvas.dimensions();
    let to_u16 = |v: u32| {
        u16::try_from(v).map_err(|_| ShunneiError::render(format!("canvas edge {v} exceeds u16")))
    };
    let (w16, h16) = (to_u16(w)?, to_u16(h)?);
    let (wf, hf) = (f64::from(w), f64::from(h));

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    if band > 0.0 {
        let [r, g, b, a] = style.stroke_color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        let band = band.min(wf / 2.0).min(hf / 2.0);
        for rect in [
            (0.0, 0.0, wf, band),
            (0.0, hf - band, wf, hf),
            (0.0, band, band, hf - band),
            (wf - band, band, wf, hf - band),
        ] {
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(rect.0, rect.1, rect.2, rect.3));
        }
    }
    if tier.safe_area_guide {
        let [r, g, b, a] = style.guide_color;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        for rect in guide_dashes(wf, hf, style) {
            ctx.fill_rect(&rect);
        }
    }
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);
    canvas.draw_premul(pixmap.data_as_u8_slice())
}

/// Dash rectangles along the inset rectangle; the pattern restarts on every side.
fn guide_dashes(w: f64, h: f64, style: &DecorStyle) -> Vec<vello_cpu::kurbo::Rect> {
    let (x0, y0) = (w * style.guide_inset, h * style.guide_inset);
    let (x1, y1) = (w - x0, h - y0);
    let half = style.guide_width / 2.0;
    let period = style.guide_dash + style.guide_gap;

    let mut out = Vec::new();
    let run = |start: f64, end: f64, emit: &mut dyn FnMut(f64, f64)| {
        let mut s = start;
        while s < end {
            emit(s, (s + style.guide_dash).min(end));
            s += period;
        }
    };
    run(x0, x1, &mut |a, b| {
        out.push(vello_cpu::kurbo::Rect::new(a, y0 - half, b, y0 + half));
        out.push(vello_cpu::kurbo::Rect::new(a, y1 - half, b, y1 + half));
    });
    run(y0, y1, &mut |a, b| {
        out.push(vello_cpu::kurbo::Rect::new(x0 - half, a, x0 + half, b));
        out.push(vello_cpu::kurbo::Rect::new(x1 - half, a, x1 + half, b));
    });
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/decor.rs"]
mod tests;
