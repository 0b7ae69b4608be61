use std::str::FromStr;

use crate::foundation::core::Bitmap;
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::foundation::math::lerp_u8;

const WHITE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Background selection. `None` keeps the cropped original photo as the base layer.
///
/// Deserializes from the short names (`"blue"`) and from the editor's action identifiers
/// (`"REMOVE_BG_BLUE"`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundChoice {
    #[default]
    None,
    #[serde(alias = "REMOVE_BG_WHITE")]
    White,
    #[serde(alias = "REMOVE_BG_BLUE")]
    Blue,
    #[serde(alias = "REMOVE_BG_GRAY")]
    Gray,
    #[serde(alias = "REMOVE_BG_PINK")]
    Pink,
    #[serde(alias = "REMOVE_BG_YELLOW")]
    Yellow,
    #[serde(alias = "REMOVE_BG_PURPLE")]
    Purple,
}

impl BackgroundChoice {
    pub const ALL: [Self; 7] = [
        Self::None,
        Self::White,
        Self::Blue,
        Self::Gray,
        Self::Pink,
        Self::Yellow,
        Self::Purple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::White => "white",
            Self::Blue => "blue",
            Self::Gray => "gray",
            Self::Pink => "pink",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
        }
    }

    /// Palette entry for a synthesized background, `None` for the photo itself.
    pub fn entry(self) -> Option<PaletteEntry> {
        let tint = |hex: u32| PaletteEntry::Radial {
            center: WHITE,
            edge: rgb_hex(hex),
        };
        match self {
            Self::None => None,
            Self::White => Some(PaletteEntry::Flat(WHITE)),
            Self::Blue => Some(tint(0xbfdbfe)),
            Self::Gray => Some(tint(0xd1d5db)),
            Self::Pink => Some(tint(0xfbcfe8)),
            Self::Yellow => Some(tint(0xfef3c7)),
            Self::Purple => Some(tint(0xe9d5ff)),
        }
    }
}

impl std::fmt::Display for BackgroundChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BackgroundChoice {
    type Err = ShunneiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let short = trimmed
            .strip_prefix("REMOVE_BG_")
            .unwrap_or(trimmed)
            .to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == short)
            .ok_or_else(|| ShunneiError::validation(format!("unknown background choice '{s}'")))
    }
}

fn rgb_hex(hex: u32) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, 0xff]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteEntry {
    Flat([u8; 4]),
    /// Two-stop radial gradient centered on the canvas, reaching `edge` at the corners.
    Radial { center: [u8; 4], edge: [u8; 4] },
}

impl PaletteEntry {
    #[tracing::instrument(skip(self))]
    pub fn synthesize(&self, width: u32, height: u32) -> ShunneiResult<Bitmap> {
        match *self {
            Self::Flat(rgba) => Bitmap::filled(width, height, rgba),
            Self::Radial { center, edge } => {
                let mut out = Bitmap::new(width, height)?;
                let cx = f64::from(width) / 2.0;
                let cy = f64::from(height) / 2.0;
                let radius = cx.hypot(cy);
                for y in 0..height {
                    let dy = f64::from(y) + 0.5 - cy;
                    for x in 0..width {
                        let dx = f64::from(x) + 0.5 - cx;
                        let t = dx.hypot(dy) / radius;
                        out.set_pixel(
                            x,
                            y,
                            [
                                lerp_u8(center[0], edge[0], t),
                                lerp_u8(center[1], edge[1], t),
                                lerp_u8(center[2], edge[2], t),
                                lerp_u8(center[3], edge[3], t),
                            ],
                        );
                    }
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/background.rs"]
mod tests;
