/// Convenience result type used across scrollreel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by configuration, sources and tooling.
///
/// The playback path itself never returns these: frame failures degrade to gap-filling and
/// undrawable frames are skipped.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided timeline or player data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame could not be fetched from its source.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Fetched bytes could not be decoded into an image.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors when reading or parsing configuration documents.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`ReelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ReelError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
