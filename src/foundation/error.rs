/// Convenience result type used across scenereel.
pub type ReelResult<T> = Result<T, ReelError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided or project data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Malformed animation or transition specification.
    #[error("animation error: {0}")]
    Animation(String),

    /// Errors while evaluating timeline state.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// A referenced media source could not be loaded or decoded.
    #[error(transparent)]
    Resource(#[from] ResourceLoadError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`ReelError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

/// Failure to obtain a media resource for a source identifier.
///
/// Cloneable so the media cache can memoize failures alongside successes.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceLoadError {
    /// The resolver has no media for this source.
    #[error("media source '{source_id}' not found")]
    NotFound {
        /// Source identifier as referenced by the element.
        source_id: String,
    },

    /// Bytes could not be fetched (IO, permissions, host failure).
    #[error("fetch media '{source_id}': {message}")]
    Fetch {
        /// Source identifier as referenced by the element.
        source_id: String,
        /// Human-readable cause.
        message: String,
    },

    /// Bytes were fetched but could not be decoded.
    #[error("decode media '{source_id}': {message}")]
    Decode {
        /// Source identifier as referenced by the element.
        source_id: String,
        /// Human-readable cause.
        message: String,
    },

    /// The resolver cannot produce this kind of media.
    #[error("media '{source_id}' is not supported: {message}")]
    Unsupported {
        /// Source identifier as referenced by the element.
        source_id: String,
        /// Human-readable cause.
        message: String,
    },
}

impl ResourceLoadError {
    /// Source identifier the failure refers to.
    pub fn source_id(&self) -> &str {
        match self {
            Self::NotFound { source_id }
            | Self::Fetch { source_id, .. }
            | Self::Decode { source_id, .. }
            | Self::Unsupported { source_id, .. } => source_id,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
