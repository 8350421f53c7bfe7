use thiserror::Error;

/// All the ways a page view can go wrong
///
/// `NotFound` and `DataStoreUnavailable` end the page computation.
/// `MalformedFavorites` never escapes `FavoritesStore::load`, it is
/// swallowed there and the user just sees nothing favorited.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Plugin not found: {0}")]
    NotFound(String),

    #[error("Catalog store unavailable: {0}")]
    DataStoreUnavailable(String),

    #[error("Favorites state is malformed: {0}")]
    MalformedFavorites(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
