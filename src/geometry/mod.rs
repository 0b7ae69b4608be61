//! Crop editing and the container-space -> source-pixel mapping.

pub(crate) mod crop;
pub(crate) mod sample;
pub(crate) mod transform;
