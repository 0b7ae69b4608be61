//! Landmark estimation and likeness restoration for regenerated portraits.

pub(crate) mod align;
pub(crate) mod anchors;
pub(crate) mod heal;
