//! Error types for ignews core types.

use crate::ids::IdError;

/// Errors raised while reading identifiers out of an event payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// `data.object` does not have the expected shape.
    #[error("malformed {object} payload: {source}")]
    Malformed {
        /// The Stripe object type that was expected.
        object: &'static str,
        /// The deserialization failure.
        #[source]
        source: serde_json::Error,
    },

    /// A required field is null or absent.
    #[error("payload is missing `{0}`")]
    MissingField(&'static str),

    /// A field holds an unusable identifier.
    #[error("invalid `{field}` in payload: {source}")]
    InvalidId {
        /// The offending field.
        field: &'static str,
        /// Why the identifier was rejected.
        #[source]
        source: IdError,
    },
}
