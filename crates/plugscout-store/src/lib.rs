// SQLite-backed catalog
// The read side implements CatalogStore, the write side is what ingestion uses

pub mod catalog;
pub mod error;
pub mod import;

pub use catalog::CatalogDb;
pub use error::StoreError;
pub use import::CatalogEntry;
