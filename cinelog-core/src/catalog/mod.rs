//! Catalog resolution: TMDB identifiers in, local catalog rows out.

pub mod locks;
pub mod mapping;
pub mod resolver;

pub use locks::{ResolutionGuard, ResolutionLocks};
pub use resolver::{CatalogResolver, ResolveError, ResolvedEpisode};
