//! Per-pixel stages: chroma keying, the shadow gaussian and premultiplied compositing.

pub(crate) mod blur;
pub(crate) mod chroma_key;
pub(crate) mod composite;
