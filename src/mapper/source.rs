//! The listing side: where resources come from.

use std::sync::Arc;

use super::ResourceKind;

/// Error type returned by a [`ResourceSource`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The identifying part of a resource record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Canonical (UUID) identifier.
    pub id: String,
    /// Human-readable name, for kinds that have one.
    pub name: Option<String>,
}

impl Resource {
    /// A resource without a name.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// A resource with a name.
    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, Default)]
pub struct Page {
    /// Resources on this page.
    pub items: Vec<Resource>,
    /// Number of resources across all pages.
    pub total: usize,
}

/// Where resource listings come from, typically the platform's REST API.
///
/// Retries, authentication and timeouts are the implementor's business.
pub trait ResourceSource {
    /// Fetch up to `limit` resources of `kind`, starting at `offset`.
    fn fetch_page(&self, kind: ResourceKind, offset: usize, limit: usize) -> Result<Page, BoxError>;
}

impl<S: ResourceSource + ?Sized> ResourceSource for &S {
    fn fetch_page(
        &self,
        kind: ResourceKind,
        offset: usize,
        limit: usize,
    ) -> Result<Page, BoxError> {
        (**self).fetch_page(kind, offset, limit)
    }
}

impl<S: ResourceSource + ?Sized> ResourceSource for Arc<S> {
    fn fetch_page(
        &self,
        kind: ResourceKind,
        offset: usize,
        limit: usize,
    ) -> Result<Page, BoxError> {
        (**self).fetch_page(kind, offset, limit)
    }
}
