//! # shortid
//!
//! Short, unambiguous references to cloud resources.
//!
//! Users rarely want to type a full UUID. Given the complete list of resources
//! of one kind, this crate works out how many leading characters of the
//! (hyphen-stripped) IDs are needed to tell every one of them apart, and then
//! resolves short IDs and names back to canonical IDs.
//!
//! The length is computed with an Adaptive Radix Tree ([`RadixTree`]): the
//! deepest leaf in the tree is the point where the two latest-diverging IDs
//! finally split.
//!
//! ## Example
//!
//! ```rust
//! use shortid::RadixTree;
//!
//! let mut tree: RadixTree<u64> = RadixTree::new();
//! tree.insert(b"aaaa1111", 1);
//! tree.insert(b"aaaa2222", 2);
//! tree.insert(b"bbbb0000", 3);
//!
//! // "aaaa1" and "aaaa2" are the shortest prefixes that tell the pair apart.
//! assert_eq!(tree.minimal_length(4), 5);
//! ```
//!
//! Resolution goes through a [`Mapper`] per kind, or an [`IdMapper`] holding
//! one of each:
//!
//! ```rust
//! use shortid::{BoxError, IdMapper, Page, Resource, ResourceKind, ResourceSource};
//!
//! struct Api;
//!
//! impl ResourceSource for Api {
//!     fn fetch_page(
//!         &self,
//!         _kind: ResourceKind,
//!         _offset: usize,
//!         _limit: usize,
//!     ) -> Result<Page, BoxError> {
//!         Ok(Page {
//!             items: vec![Resource::named("3fa85f64-5717-4562-b3fc-2c963f66afa6", "web")],
//!             total: 1,
//!         })
//!     }
//! }
//!
//! let ids = IdMapper::new(Api);
//! let id = ids.resolve_id(ResourceKind::App, "web").unwrap();
//! assert_eq!(ids.get_short_id(ResourceKind::App, &id).unwrap(), "3fa85f64");
//! ```

#![forbid(unsafe_code)]

pub mod art;
pub mod error;
pub mod idmap;
pub mod key;
pub mod mapper;
pub mod registry;

pub use art::{RadixTree, TreeStats};
pub use error::{Error, Result};
pub use idmap::IdMap;
pub use mapper::{
    AcceptedFormat, BoxError, Mapper, MapperConfig, Page, Resource, ResourceKind, ResourceSource,
};
pub use registry::IdMapper;

#[cfg(test)]
mod proptests;
