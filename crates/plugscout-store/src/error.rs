use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid catalog document: {0}")]
    InvalidCatalog(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Anything the store trips over means the catalog is unusable for this view
impl From<StoreError> for plugscout_core::Error {
    fn from(err: StoreError) -> Self {
        plugscout_core::Error::DataStoreUnavailable(err.to_string())
    }
}
