//! One [`Mapper`] per resource kind behind a single entry point.

use std::sync::Arc;

use crate::error::Result;
use crate::mapper::{Mapper, MapperConfig, ResourceKind, ResourceSource};

/// Resolves references for every [`ResourceKind`] against one source.
///
/// Each kind is listed independently, the first time it is needed.
pub struct IdMapper<S> {
    mappers: [Mapper<S>; ResourceKind::COUNT],
}

impl<S: ResourceSource> IdMapper<S> {
    /// Create a mapper set with default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, MapperConfig::default())
    }

    /// Create a mapper set with the given configuration.
    pub fn with_config(source: S, config: MapperConfig) -> Self {
        let source = Arc::new(source);
        Self {
            mappers: std::array::from_fn(|i| {
                Mapper::new(ResourceKind::ALL[i], Arc::clone(&source), config.clone())
            }),
        }
    }

    /// The mapper for one kind.
    pub fn mapper(&self, kind: ResourceKind) -> &Mapper<S> {
        &self.mappers[kind as usize]
    }

    /// See [`Mapper::resolve_id`].
    pub fn resolve_id(&self, kind: ResourceKind, input: &str) -> Result<String> {
        self.mapper(kind).resolve_id(input)
    }

    /// See [`Mapper::get_short_id`].
    pub fn get_short_id(&self, kind: ResourceKind, id: &str) -> Result<String> {
        self.mapper(kind).get_short_id(id)
    }

    /// See [`Mapper::get_name`].
    pub fn get_name(&self, kind: ResourceKind, id: &str) -> Result<String> {
        self.mapper(kind).get_name(id)
    }
}
