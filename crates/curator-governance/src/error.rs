//! Error types for governance operations.

use thiserror::Error;

use curator_metadata::MetadataError;

/// Result type alias for governance operations.
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Errors that can occur during tag-governance operations.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// A tag failed the syntactic rule, or no tags were supplied.
    #[error("invalid tag: {message}")]
    InvalidTag {
        /// Description of what was rejected.
        message: String,
    },

    /// A request parameter was invalid (e.g. an unknown entity type).
    #[error("invalid parameter: {message}")]
    InvalidParameter {
        /// Description of the invalid parameter.
        message: String,
    },

    /// The tag is not in the preferred set.
    #[error("preferred tag not found: {tag}")]
    NotFound {
        /// The tag that was looked up.
        tag: String,
    },

    /// The tag is still attached to live entities and cannot be deleted.
    #[error("tag {tag} is attached to {entities} entities")]
    TagInUse {
        /// The tag the delete was attempted on.
        tag: String,
        /// How many entities still carry it.
        entities: usize,
    },

    /// The preferred-tag store failed.
    #[error("store error: {0}")]
    Store(#[from] curator_core::Error),

    /// The metadata access layer failed.
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl GovernanceError {
    /// Creates an invalid-tag error with the given message.
    #[must_use]
    pub fn invalid_tag(message: impl Into<String>) -> Self {
        Self::InvalidTag {
            message: message.into(),
        }
    }

    /// Creates an invalid-parameter error with the given message.
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
