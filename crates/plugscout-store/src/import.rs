// Catalog ingestion from the JSON dump the indexer produces
use plugscout_core::Plugin;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::catalog::{write_plugin, write_tags, CatalogDb};
use crate::error::StoreError;

/// One element of the catalog dump: a plugin record with its raw tags inline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub plugin: Plugin,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CatalogDb {
    /// Import every entry in one transaction. Either the whole dump lands or none of it does.
    pub fn import_entries(&self, entries: &[CatalogEntry]) -> Result<usize, StoreError> {
        let tx = self.conn().unchecked_transaction()?;

        for entry in entries {
            write_plugin(&tx, &entry.plugin)?;
            write_tags(&tx, &entry.plugin.plugin_id, &entry.tags)?;
            debug!(plugin = %entry.plugin.plugin_id, tags = entry.tags.len(), "Imported plugin");
        }

        tx.commit()?;
        info!(count = entries.len(), "Imported catalog entries");
        Ok(entries.len())
    }

    pub fn import_json(&self, json: &str) -> Result<usize, StoreError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        self.import_entries(&entries)
    }

    pub fn import_file(&self, path: &Path) -> Result<usize, StoreError> {
        let json = std::fs::read_to_string(path)?;
        self.import_json(&json)
    }
}
