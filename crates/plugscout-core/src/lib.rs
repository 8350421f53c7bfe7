// Discovery logic for the plugin catalog - everything that decides something lives here
pub mod catalog;
pub mod config;
pub mod error;
pub mod favorites;
pub mod freshness;
pub mod models;
pub mod pages;
pub mod similarity;
pub mod tags;
pub mod trending;
pub mod updates;

pub use catalog::CatalogStore;
pub use config::Config;
pub use error::Error;
pub use favorites::{FavoritesBackend, FavoritesStore, JsonFileBackend, MemoryBackend};
pub use freshness::{is_recent, is_recent_at};
pub use models::{Plugin, PluginCard, PluginLinks};
pub use pages::{PageAssembler, PluginPage, UpdatesPage};
pub use similarity::SimilarityResolver;
pub use tags::TagDenyList;
pub use trending::is_trending;
pub use updates::{recent_releases, recent_releases_at};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
