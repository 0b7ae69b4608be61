//! Background synthesis, decoration and the composite entry points.

pub(crate) mod background;
pub(crate) mod compositor;
pub(crate) mod decor;
pub(crate) mod session;
