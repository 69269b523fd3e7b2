//! Persistence ports and their adapters.

pub mod memory;
pub mod ports;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod infrastructure;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod postgres;

pub use memory::InMemoryBackend;

#[cfg(feature = "database")]
pub use postgres::PostgresDatabase;
