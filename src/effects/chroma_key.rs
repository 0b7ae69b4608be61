//! Color-keyed transparency extraction with rim despill.
//!
//! The generation service paints the subject over a saturated key color. For each pixel the
//! dominance of the key channel over the strongest other channel (`diff`) decides its fate:
//!
//! - `diff > high_threshold`: background, alpha 0.
//! - `low_threshold < diff <= high_threshold`: edge band, alpha falls off across the band and
//!   the key channel is clamped down to the other channels so no tint survives on the rim.
//! - `diff <= low_threshold`: subject interior, left untouched. Interior pixels are never
//!   despilled, which keeps genuinely green clothing and eyes intact.
//!
//! Known limitation: subject regions whose own `diff` exceeds `low_threshold` (saturated green
//! garments on a green key) are keyed as edge or background. Thresholds trade rim softness
//! against background leakage and are tuned once in [`ChromaKeyConfig`].

use crate::foundation::core::Bitmap;
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::{mul_div255_u8, quantize_u8};

/// Which channel the backdrop saturates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyColor {
    #[default]
    Green,
    Blue,
}

impl KeyColor {
    fn channels(self) -> (usize, usize, usize) {
        match self {
            Self::Green => (1, 0, 2),
            Self::Blue => (2, 0, 1),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChromaKeyConfig {
    pub key: KeyColor,
    /// At or below this `diff` a pixel is subject interior.
    pub low_threshold: i16,
    /// Above this `diff` a pixel is fully keyed out.
    pub high_threshold: i16,
    /// Shapes the alpha ramp across the band; `1.0` is linear, larger values fade faster.
    pub falloff_exponent: f64,
}

impl Default for ChromaKeyConfig {
    fn default() -> Self {
        Self {
            key: KeyColor::Green,
            low_threshold: 10,
            high_threshold: 45,
            falloff_exponent: 1.0,
        }
    }
}

impl ChromaKeyConfig {
    pub fn validate(&self) -> ShunneiResult<()> {
        if self.low_threshold >= self.high_threshold {
            return Err(ShunneiError::validation(format!(
                "chroma key low_threshold ({}) must be below high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if !(-255..=255).contains(&self.low_threshold)
            || !(-255..=255).contains(&self.high_threshold)
        {
            return Err(ShunneiError::validation(
                "chroma key thresholds must lie in [-255, 255]",
            ));
        }
        if !self.falloff_exponent.is_finite() || self.falloff_exponent <= 0.0 {
            return Err(ShunneiError::validation(
                "chroma key falloff_exponent must be > 0",
            ));
        }
        Ok(())
    }
}

/// Per-call tallies, logged at debug level.
#[derive(Clone, Copy, Debug, Default)]
struct KeyStats {
    keyed: u64,
    edge: u64,
    interior: u64,
}

#[derive(Clone, Debug)]
pub struct ChromaKeyExtractor {
    config: ChromaKeyConfig,
}

impl ChromaKeyExtractor {
    pub fn new(config: ChromaKeyConfig) -> ShunneiResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ChromaKeyConfig {
        &self.config
    }

    /// Key a single straight-alpha pixel.
    pub fn key_pixel(&self, px: [u8; 4]) -> [u8; 4] {
        self.classify(px).0
    }

    fn classify(&self, px: [u8; 4]) -> ([u8; 4], Class) {
        let (k, o1, o2) = self.config.key.channels();
        let max_other = px[o1].max(px[o2]);
        let diff = i16::from(px[k]) - i16::from(max_other);
        let (low, high) = (self.config.low_threshold, self.config.high_threshold);

        if diff > high {
            let mut out = px;
            out[3] = 0;
            return (out, Class::Keyed);
        }
        if diff <= low {
            return (px, Class::Interior);
        }

        let t = f64::from(diff - low) / f64::from(high - low);
        let ramp = (1.0 - t).powf(self.config.falloff_exponent);
        let band_alpha = quantize_u8(255.0 * ramp);
        if band_alpha == 255 {
            return (px, Class::Interior);
        }

        let mut out = px;
        out[k] = max_other;
        out[3] = mul_div255_u8(u16::from(px[3]), u16::from(band_alpha));
        (out, Class::Edge)
    }

    /// Produce a same-size bitmap with the key color removed.
    #[tracing::instrument(
        skip(self, foreground),
        fields(w = foreground.width(), h = foreground.height())
    )]
    pub fn extract(&self, foreground: &Bitmap) -> ShunneiResult<Bitmap> {
        let mut data = Vec::with_capacity(foreground.as_bytes().len());
        let mut stats = KeyStats::default();
        for px in foreground.as_bytes().chunks_exact(4) {
            let (out, class) = self.classify([px[0], px[1], px[2], px[3]]);
            match class {
                Class::Keyed => stats.keyed += 1,
                Class::Edge => stats.edge += 1,
                Class::Interior => stats.interior += 1,
            }
            data.extend_from_slice(&out);
        }
        tracing::debug!(
            keyed = stats.keyed,
            edge = stats.edge,
            interior = stats.interior,
            "chroma key applied"
        );
        Bitmap::from_rgba8(foreground.width(), foreground.height(), data)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Class {
    Keyed,
    Edge,
    Interior,
}

#[cfg(test)]
#[path = "../../tests/unit/effects/chroma_key.rs"]
mod tests;
