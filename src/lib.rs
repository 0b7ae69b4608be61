//! Deterministic portrait compositing.
//!
//! Given a crop of a source photo, a regenerated foreground on a key color and a background
//! choice, [`CompositeRenderer::render`] produces the same bitmap every time, at preview or
//! print resolution. The pipeline, leaf-first:
//!
//! - [`CropTransform`] maps a container-space [`CropRegion`] (plus tilt) onto source pixels.
//! - [`ChromaKeyExtractor`] turns the key color into alpha and despills the rim.
//! - [`AnchorLocator`] estimates eyes and mouth; [`DarkestRegionLocator`] is the heuristic.
//! - [`RegionHealer`] blends original eye/mouth detail back through a [`SimilarityTransform`].
//! - [`BackgroundChoice`] selects a flat or radial [`PaletteEntry`], or the photo itself.
//! - [`CompositeRenderer`] layers everything and adds the tier's border decoration.
//!
//! Interactive callers sequence requests through a [`RenderGate`] so stale results are dropped.
#![forbid(unsafe_code)]

mod assets;
mod config;
mod effects;
mod face;
mod foundation;
mod geometry;
mod render;

pub use assets::decode::{decode_image, encode_png, load_image, save_png};
pub use config::EngineConfig;
pub use effects::chroma_key::{ChromaKeyConfig, ChromaKeyExtractor, KeyColor};
pub use face::align::SimilarityTransform;
pub use face::anchors::{
    AnchorLocator, AnchorPoint, DarkestRegionLocator, FaceAnchors, LocatorConfig, SearchBox,
};
pub use face::heal::{HealConfig, HealOutcome, HealReport, RegionHealer};
pub use foundation::core::{Affine, Bitmap, ContainerSize, MAX_DIMENSION, Point, Rect, Vec2};
pub use foundation::error::{ShunneiError, ShunneiResult};
pub use geometry::crop::{CropEditor, CropRegion, MIN_CROP_WIDTH, PORTRAIT_ASPECT, RotationMode};
pub use geometry::sample::{cover_fit, resize, sample_bilinear, warp_affine};
pub use geometry::transform::{CropTransform, FitLayout};
pub use render::background::{BackgroundChoice, PaletteEntry};
pub use render::compositor::{
    CompositeRenderer, CompositeSpec, FOREGROUND_ASPECT_TOLERANCE, ResolutionTier, SourceCrop,
    SourceLayer, validate_foreground,
};
pub use render::decor::{DecorStyle, TierProfile};
pub use render::session::{RenderGate, RenderTicket, TierRenders, render_tiers};
