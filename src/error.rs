//! Errors raised while listing and resolving resources.

use thiserror::Error;

use crate::mapper::kind::describe_formats;
use crate::mapper::{AcceptedFormat, BoxError, ResourceKind};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong turning a reference into a canonical ID.
///
/// Retrieval failures come from the [`ResourceSource`](crate::ResourceSource)
/// and are worth retrying. `NotFound` and `UnknownId` mean the input does not
/// match anything listed.
#[derive(Error, Debug)]
pub enum Error {
    /// Listing the collection failed; nothing was indexed.
    #[error("Could not list {kind} resources (offset {offset}): {source}")]
    Retrieval {
        kind: ResourceKind,
        offset: usize,
        source: BoxError,
    },

    /// The input is neither a full ID nor a listed short ID or name.
    #[error("{kind} `{input}` not found: expected {}", describe_formats(.accepted))]
    NotFound {
        kind: ResourceKind,
        input: String,
        accepted: Vec<AcceptedFormat>,
    },

    /// A canonical ID that was not part of the listing.
    #[error("{kind} `{id}` is not among the listed {kind} resources")]
    UnknownId {
        kind: ResourceKind,
        id: String,
    },

    /// Names were asked for on a kind that has none.
    #[error("{0} resources have no name")]
    NoName(ResourceKind),

    #[error("Unknown resource kind: `{0}`")]
    UnknownKind(String),

    /// Two distinct IDs collapsed to one key. Indicates a bug, not bad input.
    #[error("Internal error: {kind} IDs `{first}` and `{second}` normalize to the same key")]
    KeyCollision {
        kind: ResourceKind,
        first: String,
        second: String,
    },

    /// The computed length left two resources sharing a short ID. Indicates a bug, not bad input.
    #[error("Internal error: short ID `{short_id}` is shared by several {kind} resources")]
    ShortIdCollision {
        kind: ResourceKind,
        short_id: String,
    },
}

impl Error {
    /// Whether the input simply does not match any resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::UnknownId { .. })
    }

    /// Whether this error reports a broken internal invariant rather than a
    /// user or network problem.
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::KeyCollision { .. } | Error::ShortIdCollision { .. })
    }
}
