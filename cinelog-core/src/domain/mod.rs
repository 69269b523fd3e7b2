//! Domain records shared by the resolver, the recorder and the persistence
//! adapters.

pub mod catalog;
pub mod watch;
pub mod webhook;

pub use catalog::{
    CatalogKey, Movie, NewEpisode, NewMovie, NewSeason, NewTvShow, TvShow,
    TvShowEpisode, TvShowSeason,
};
pub use watch::{
    NewWatch, StreamingService, Watch, WatchLocation, WatchTag, WatchTarget,
};
pub use webhook::WebhookConfig;
