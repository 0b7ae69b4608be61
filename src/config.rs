//! Engine tuning in one place. Every field has a documented default, and partial JSON files
//! override only what they name.

use std::path::Path;

use anyhow::Context;

use crate::effects::chroma_key::ChromaKeyConfig;
use crate::face::anchors::LocatorConfig;
use crate::face::heal::HealConfig;
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::render::compositor::ResolutionTier;
use crate::render::decor::{DecorStyle, TierProfile};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub chroma: ChromaKeyConfig,
    pub locator: LocatorConfig,
    pub heal: HealConfig,
    pub decor: DecorStyle,
    pub preview: TierProfile,
    pub print: TierProfile,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chroma: ChromaKeyConfig::default(),
            locator: LocatorConfig::default(),
            heal: HealConfig::default(),
            decor: DecorStyle::default(),
            preview: TierProfile::preview(),
            print: TierProfile::print(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ShunneiResult<()> {
        self.chroma.validate()?;
        self.locator.validate()?;
        self.heal.validate()?;
        self.decor.validate()?;
        self.preview.validate()?;
        self.print.validate()?;
        Ok(())
    }

    pub fn tier_profile(&self, tier: ResolutionTier) -> &TierProfile {
        match tier {
            ResolutionTier::Preview => &self.preview,
            ResolutionTier::Print => &self.print,
        }
    }

    pub fn from_json_str(s: &str) -> ShunneiResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| ShunneiError::validation(format!("invalid engine config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ShunneiResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read engine config {}", path.display()))?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
