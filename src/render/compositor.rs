use crate::config::EngineConfig;
use crate::effects::chroma_key::ChromaKeyExtractor;
use crate::effects::composite::Canvas;
use crate::face::anchors::{AnchorLocator, DarkestRegionLocator};
use crate::face::heal::RegionHealer;
use crate::foundation::core::{Bitmap, ContainerSize, MAX_DIMENSION};
use crate::foundation::error::{ShunneiError, ShunneiResult};
use crate::geometry::crop::CropRegion;
use crate::geometry::sample::{cover_fit, resize};
use crate::geometry::transform::CropTransform;
use crate::render::background::BackgroundChoice;
use crate::render::decor::draw_decoration;

/// Largest relative aspect mismatch accepted between a returned foreground and the output.
pub const FOREGROUND_ASPECT_TOLERANCE: f64 = 0.02;

/// Named output profile. Both tiers run the same compositing; only decoration differs.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionTier {
    #[default]
    Preview,
    Print,
}

impl ResolutionTier {
    /// Standard output size for the tier: the on-screen preview and the print export. Both keep
    /// the 3:4 portrait aspect so one foreground serves either tier.
    pub fn default_size(self) -> (u32, u32) {
        match self {
            Self::Preview => (800, 1067),
            Self::Print => (2700, 3600),
        }
    }
}

/// Live crop of the original photo, resolved at output size on every render.
#[derive(Clone, Copy, Debug)]
pub struct SourceCrop<'a> {
    pub source: &'a Bitmap,
    pub container: ContainerSize,
    pub region: CropRegion,
}

#[derive(Clone, Copy, Debug)]
pub enum SourceLayer<'a> {
    Crop(SourceCrop<'a>),
    /// An original that was already cropped; drawn cover-fit.
    Cropped(&'a Bitmap),
}

/// Inputs of one render call. Built per call and never mutated.
#[derive(Clone, Copy, Debug)]
pub struct CompositeSpec<'a> {
    pub source: SourceLayer<'a>,
    pub foreground: Option<&'a Bitmap>,
    pub background: BackgroundChoice,
    pub output_width: u32,
    pub output_height: u32,
    pub tier: ResolutionTier,
}

impl<'a> CompositeSpec<'a> {
    /// Same inputs at `tier`'s standard size.
    pub fn at_tier(&self, tier: ResolutionTier) -> Self {
        let (output_width, output_height) = tier.default_size();
        Self {
            output_width,
            output_height,
            tier,
            ..*self
        }
    }

    fn validate(&self) -> ShunneiResult<()> {
        let (w, h) = (self.output_width, self.output_height);
        if w == 0 || h == 0 || w > MAX_DIMENSION || h > MAX_DIMENSION {
            return Err(ShunneiError::validation(format!(
                "output size {w}x{h} must be within 1..={MAX_DIMENSION}"
            )));
        }
        if let SourceLayer::Crop(crop) = &self.source {
            crop.region.validate_bounds()?;
        }
        Ok(())
    }
}

/// Orchestrates background, keyed and healed foreground, and decoration into one bitmap.
///
/// `render` is a pure function of the spec, the referenced bitmaps and the configuration.
#[derive(Debug)]
pub struct CompositeRenderer<L = DarkestRegionLocator> {
    config: EngineConfig,
    keyer: ChromaKeyExtractor,
    healer: RegionHealer<L>,
}

impl CompositeRenderer {
    pub fn new(config: EngineConfig) -> ShunneiResult<Self> {
        let locator = DarkestRegionLocator::new(config.locator.clone())?;
        Self::with_locator(config, locator)
    }
}

impl<L: AnchorLocator> CompositeRenderer<L> {
    pub fn with_locator(config: EngineConfig, locator: L) -> ShunneiResult<Self> {
        config.validate()?;
        Ok(Self {
            keyer: ChromaKeyExtractor::new(config.chroma.clone())?,
            healer: RegionHealer::new(locator, config.heal.clone())?,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[tracing::instrument(
        skip(self, spec),
        fields(
            tier = ?spec.tier,
            w = spec.output_width,
            h = spec.output_height,
            background = %spec.background,
            foreground = spec.foreground.is_some(),
        )
    )]
    pub fn render(&self, spec: &CompositeSpec<'_>) -> ShunneiResult<Bitmap> {
        spec.validate()?;
        let (w, h) = (spec.output_width, spec.output_height);
        if let Some(fg) = spec.foreground {
            validate_foreground(fg, w, h)?;
        }

        let needs_photo = spec.background == BackgroundChoice::None || spec.foreground.is_some();
        let photo = if needs_photo {
            Some(source_photo(&spec.source, w, h)?)
        } else {
            None
        };

        let base = match (spec.background.entry(), &photo) {
            (Some(entry), _) => entry.synthesize(w, h)?,
            (None, Some(photo)) => photo.clone(),
            (None, None) => {
                return Err(ShunneiError::render("background photo was not prepared"));
            }
        };
        let mut canvas = Canvas::from_bitmap(&base);

        if let (Some(fg), Some(photo)) = (spec.foreground, &photo) {
            let sized = resize(fg, w, h)?;
            let keyed = self.keyer.extract(&sized)?;
            let healed = self.healer.heal(&keyed, photo)?;
            tracing::debug!(report = ?healed.report, "foreground healed");
            canvas.draw_bitmap(&healed.bitmap, 255)?;
        }

        draw_decoration(
            &mut canvas,
            &self.config.decor,
            self.config.tier_profile(spec.tier),
        )?;
        canvas.into_bitmap()
    }
}

fn source_photo(source: &SourceLayer<'_>, w: u32, h: u32) -> ShunneiResult<Bitmap> {
    match source {
        SourceLayer::Crop(crop) => {
            let (nw, nh) = crop.source.dimensions();
            CropTransform::new(nw, nh, crop.container, &crop.region)?.render(crop.source, w, h)
        }
        SourceLayer::Cropped(bitmap) => cover_fit(bitmap, w, h),
    }
}

/// A returned cutout must keep the requested aspect; it is then resized to the output.
pub fn validate_foreground(fg: &Bitmap, out_w: u32, out_h: u32) -> ShunneiResult<()> {
    let want = f64::from(out_w) / f64::from(out_h);
    let got = fg.aspect();
    if (got / want - 1.0).abs() > FOREGROUND_ASPECT_TOLERANCE {
        return Err(ShunneiError::foreground(format!(
            "foreground is {}x{} (aspect {got:.4}), output {out_w}x{out_h} needs {want:.4}",
            fg.width(),
            fg.height()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
