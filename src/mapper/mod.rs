//! Per-resource-kind resolution between canonical IDs, short IDs and names.
//!
//! A [`Mapper`] lists its whole collection once, on first use, indexes the
//! normalized IDs in a [`RadixTree`] to find the shortest collision-free
//! prefix length, and keeps only the resulting lookup tables. Nothing is
//! refreshed afterwards: the index lives as long as the mapper.

pub(crate) mod kind;
mod source;

pub use kind::{AcceptedFormat, ResourceKind};
pub use source::{BoxError, Page, Resource, ResourceSource};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::art::RadixTree;
use crate::error::{Error, Result};
use crate::idmap::IdMap;
use crate::key;

/// Configuration for a [`Mapper`].
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Number of resources requested per page
    pub page_size: usize,
    /// Short IDs are never shorter than this
    pub min_short_id_len: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            min_short_id_len: 8,
        }
    }
}

impl MapperConfig {
    /// Set the page size. Zero is treated as one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Set the minimum short ID length.
    pub fn with_min_short_id_len(mut self, len: usize) -> Self {
        self.min_short_id_len = len;
        self
    }
}

/// Lookup tables derived from one full listing.
#[derive(Debug)]
struct Index {
    short_id_len: usize,
    short_ids: IdMap,
    /// Name to ID for resolution. A shared name goes to its first holder.
    names: IdMap,
    /// Every listed name, by ID.
    name_of: HashMap<String, String>,
}

/// Resolves references to resources of a single kind.
///
/// Safe to share between threads: the first caller lists the collection while
/// concurrent callers wait for it. A failed listing leaves the mapper empty,
/// so the next call tries again.
pub struct Mapper<S> {
    kind: ResourceKind,
    source: Arc<S>,
    config: MapperConfig,
    index: Mutex<Option<Arc<Index>>>,
}

impl<S: ResourceSource> Mapper<S> {
    /// Create a mapper. Nothing is fetched until the first lookup.
    pub fn new(kind: ResourceKind, source: Arc<S>, config: MapperConfig) -> Self {
        Self {
            kind,
            source,
            config,
            index: Mutex::new(None),
        }
    }

    /// The kind this mapper resolves.
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Whether the collection has been listed.
    pub fn is_loaded(&self) -> bool {
        self.index.lock().is_some()
    }

    /// Turn a full ID, short ID or name into a canonical ID.
    ///
    /// Full IDs are returned lowercased without listing anything.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        if key::is_canonical_id(input) {
            return Ok(input.to_ascii_lowercase());
        }

        let index = self.index()?;
        let by_short_id = index
            .short_ids
            .get_id(input)
            .or_else(|| index.short_ids.get_id(&input.to_ascii_lowercase()));
        if let Some(id) = by_short_id {
            return Ok(id.to_string());
        }
        if let Some(id) = index.names.get_id(input) {
            return Ok(id.to_string());
        }

        Err(Error::NotFound {
            kind: self.kind,
            input: input.to_string(),
            accepted: self.kind.accepted_formats(index.short_id_len),
        })
    }

    /// The short ID of a listed resource.
    pub fn get_short_id(&self, id: &str) -> Result<String> {
        let index = self.index()?;
        index
            .short_ids
            .get_value(id)
            .map(str::to_string)
            .ok_or_else(|| self.unknown(id))
    }

    /// The name of a listed resource.
    pub fn get_name(&self, id: &str) -> Result<String> {
        if !self.kind.has_name() {
            return Err(Error::NoName(self.kind));
        }
        let index = self.index()?;
        index
            .name_of
            .get(id)
            .cloned()
            .ok_or_else(|| self.unknown(id))
    }

    /// Length of the short IDs handed out by this mapper.
    pub fn short_id_len(&self) -> Result<usize> {
        Ok(self.index()?.short_id_len)
    }

    fn unknown(&self, id: &str) -> Error {
        Error::UnknownId {
            kind: self.kind,
            id: id.to_string(),
        }
    }

    fn index(&self) -> Result<Arc<Index>> {
        // Held across the fetch so only one caller lists the collection.
        let mut slot = self.index.lock();
        if let Some(index) = slot.as_ref() {
            return Ok(Arc::clone(index));
        }

        let resources = self.fetch_all()?;
        let index = Arc::new(self.build(&resources)?);
        *slot = Some(Arc::clone(&index));
        Ok(index)
    }

    fn fetch_all(&self) -> Result<Vec<Resource>> {
        let limit = self.config.page_size.max(1);
        let mut resources = Vec::new();
        let mut offset = 0;

        loop {
            let page = self
                .source
                .fetch_page(self.kind, offset, limit)
                .map_err(|source| Error::Retrieval {
                    kind: self.kind,
                    offset,
                    source,
                })?;
            debug!(
                kind = %self.kind,
                offset,
                fetched = page.items.len(),
                total = page.total,
                "listed page"
            );
            resources.extend(page.items);

            offset += limit;
            if offset >= page.total {
                break;
            }
        }

        Ok(resources)
    }

    fn build(&self, resources: &[Resource]) -> Result<Index> {
        let mut tree: RadixTree<&str> = RadixTree::new();
        for resource in resources {
            let key = key::normalize(&resource.id);
            if tree.insert(&key, &resource.id) {
                continue;
            }
            match tree.get(&key) {
                Some(&first) if first != resource.id => {
                    return Err(Error::KeyCollision {
                        kind: self.kind,
                        first: first.to_string(),
                        second: resource.id.clone(),
                    });
                }
                _ => debug!(kind = %self.kind, id = %resource.id, "skipping repeated resource"),
            }
        }

        let short_id_len = tree.minimal_length(self.config.min_short_id_len);
        let mut short_ids = IdMap::with_capacity(tree.len());
        let mut collision = None;
        tree.for_each(|key, id| {
            let short_id = key::short_id(key, short_id_len);
            if short_ids.get_id(&short_id).is_some() {
                collision.get_or_insert(short_id);
                return;
            }
            short_ids.set(*id, short_id);
        });
        if let Some(short_id) = collision {
            return Err(Error::ShortIdCollision {
                kind: self.kind,
                short_id,
            });
        }

        let mut names = IdMap::new();
        let mut name_of = HashMap::new();
        if self.kind.has_name() {
            for resource in resources {
                let Some(name) = resource.name.as_deref() else {
                    continue;
                };
                name_of.insert(resource.id.clone(), name.to_string());
                let taken_by = names
                    .get_id(name)
                    .filter(|owner| *owner != resource.id)
                    .map(str::to_string);
                match taken_by {
                    Some(owner) => warn!(
                        kind = %self.kind,
                        name,
                        owner = %owner,
                        skipped = %resource.id,
                        "name shared by several resources, resolving it to the first"
                    ),
                    None => names.set(resource.id.as_str(), name),
                }
            }
        }

        debug!(
            kind = %self.kind,
            resources = short_ids.len(),
            short_id_len,
            inner_nodes = tree.stats().inner_count(),
            "built short ID index"
        );

        Ok(Index {
            short_id_len,
            short_ids,
            names,
            name_of,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Listing {
        items: Vec<Resource>,
        calls: AtomicUsize,
    }

    impl Listing {
        fn new(items: Vec<Resource>) -> Arc<Self> {
            Arc::new(Self {
                items,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl ResourceSource for Listing {
        fn fetch_page(
            &self,
            _kind: ResourceKind,
            offset: usize,
            limit: usize,
        ) -> std::result::Result<Page, BoxError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let end = (offset + limit).min(self.items.len());
            Ok(Page {
                items: self.items.get(offset..end).unwrap_or_default().to_vec(),
                total: self.items.len(),
            })
        }
    }

    #[test]
    fn test_pages_until_total() {
        let items: Vec<Resource> = (0..25u128)
            .map(|i| Resource::new(uuid::Uuid::from_u128(i << 64 | 0xabc).to_string()))
            .collect();
        let source = Listing::new(items.clone());
        let mapper = Mapper::new(
            ResourceKind::Instance,
            Arc::clone(&source),
            MapperConfig::default().with_page_size(10),
        );

        for item in &items {
            let short = mapper.get_short_id(&item.id).expect("listed");
            assert_eq!(mapper.resolve_id(&short).expect("resolvable"), item.id);
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_empty_listing_makes_one_call() {
        let source = Listing::new(Vec::new());
        let mapper = Mapper::new(ResourceKind::App, Arc::clone(&source), MapperConfig::default());

        assert!(mapper.resolve_id("foo").is_err());
        assert!(mapper.resolve_id("bar").is_err());
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(mapper.short_id_len().ok(), Some(8));
    }

    #[test]
    fn test_repeated_resource_is_indexed_once() {
        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let source = Listing::new(vec![Resource::named(id, "web"), Resource::named(id, "web")]);
        let mapper = Mapper::new(ResourceKind::App, source, MapperConfig::default());

        assert_eq!(mapper.get_short_id(id).ok().as_deref(), Some("3fa85f64"));
        assert_eq!(mapper.resolve_id("web").ok().as_deref(), Some(id));
    }

    #[test]
    fn test_short_id_lookup_ignores_case() {
        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let source = Listing::new(vec![Resource::named(id, "web")]);
        let mapper = Mapper::new(ResourceKind::App, source, MapperConfig::default());

        assert_eq!(mapper.resolve_id("3FA85F64").ok().as_deref(), Some(id));
    }

    #[test]
    fn test_uppercase_full_id_resolves_to_listed_form() {
        let id = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let source = Listing::new(vec![Resource::named(id, "web")]);
        let mapper = Mapper::new(ResourceKind::App, Arc::clone(&source), MapperConfig::default());

        let resolved = mapper.resolve_id(&id.to_ascii_uppercase()).expect("full ID");
        assert_eq!(resolved, id);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(mapper.get_short_id(&resolved).ok().as_deref(), Some("3fa85f64"));
    }

    #[test]
    fn test_shared_name_resolves_to_first_holder() {
        let first = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
        let second = "4fa85f64-5717-4562-b3fc-2c963f66afa6";
        let source = Listing::new(vec![
            Resource::named(first, "web"),
            Resource::named(second, "web"),
        ]);
        let mapper = Mapper::new(ResourceKind::App, source, MapperConfig::default());

        assert_eq!(mapper.resolve_id("web").ok().as_deref(), Some(first));
        assert_eq!(mapper.get_name(first).ok().as_deref(), Some("web"));
        assert_eq!(mapper.get_name(second).ok().as_deref(), Some("web"));
        assert_eq!(mapper.resolve_id("4fa85f64").ok().as_deref(), Some(second));
    }

    #[test]
    fn test_separator_collision_is_internal_error() {
        let source = Listing::new(vec![Resource::new("ab-cd"), Resource::new("abc-d")]);
        let mapper = Mapper::new(ResourceKind::App, source, MapperConfig::default());

        let err = mapper.resolve_id("abcd").unwrap_err();
        assert!(err.is_internal());
        assert!(!err.is_not_found());
        match err {
            Error::KeyCollision {
                kind,
                first,
                second,
            } => {
                assert_eq!(kind, ResourceKind::App);
                assert_eq!(first, "ab-cd");
                assert_eq!(second, "abc-d");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(!mapper.is_loaded());
    }
}
