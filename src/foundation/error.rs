/// Convenience result type used across the engine.
pub type ShunneiResult<T> = Result<T, ShunneiError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant aborts the render call that produced it; no stage substitutes a degraded
/// bitmap for a failed input.
#[derive(thiserror::Error, Debug)]
pub enum ShunneiError {
    /// Invalid caller-provided data (sizes, configuration values).
    #[error("validation error: {0}")]
    Validation(String),

    /// Crop rectangle or rotation outside the accepted bounds.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A source or foreground bitmap could not be loaded.
    #[error("decode error: {0}")]
    Decode(String),

    /// A generated foreground does not fit the requested composite.
    #[error("foreground error: {0}")]
    Foreground(String),

    /// Internal failures while producing pixels.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShunneiError {
    /// Build a [`ShunneiError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ShunneiError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`ShunneiError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ShunneiError::Foreground`] value.
    pub fn foreground(msg: impl Into<String>) -> Self {
        Self::Foreground(msg.into())
    }

    /// Build a [`ShunneiError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
