use crate::{models::Plugin, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Read side of the catalog database
///
/// Discovery logic only ever talks to the catalog through this trait, so
/// tests can swap in a mock and the SQLite store stays a detail.
/// Any failure comes back as `Error::DataStoreUnavailable`; nothing here
/// retries.
#[cfg_attr(test, mockall::automock)]
pub trait CatalogStore {
    fn find_plugin_by_id(&self, id: &str) -> Result<Option<Plugin>>;

    fn find_plugins_by_ids(&self, ids: &BTreeSet<String>) -> Result<Vec<Plugin>>;

    /// Every slug in the catalog, one detail page each
    fn find_all_plugin_ids(&self) -> Result<Vec<String>>;

    fn find_tags_for_plugin(&self, id: &str) -> Result<Vec<String>>;

    /// Distinct ids of plugins carrying any of `tags`, minus `excluding_id`
    fn find_plugin_ids_by_tags(
        &self,
        tags: &BTreeSet<String>,
        excluding_id: &str,
    ) -> Result<Vec<String>>;

    /// Plugins whose latest release is strictly after `cutoff`
    fn find_plugins_released_after(&self, cutoff: DateTime<Utc>) -> Result<Vec<Plugin>>;
}
