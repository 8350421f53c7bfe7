// "Similar plugins" - anything sharing at least one meaningful tag
use crate::{catalog::CatalogStore, models::Plugin, tags::TagDenyList, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// Finds catalog entries that share tags with a focal plugin
pub struct SimilarityResolver<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    deny_list: &'a TagDenyList,
}

impl<'a, S: CatalogStore + ?Sized> SimilarityResolver<'a, S> {
    pub fn new(store: &'a S, deny_list: &'a TagDenyList) -> Self {
        Self { store, deny_list }
    }

    /// Plugins sharing at least one non-denied tag with `focal`
    ///
    /// Each plugin shows up once no matter how many tags it shares, and
    /// `focal` itself never does. Ordered by plugin id. No tags, or only
    /// denied ones, means no similar plugins - that's not an error.
    pub fn similar<T: AsRef<str>>(&self, focal: &Plugin, focal_tags: &[T]) -> Result<Vec<Plugin>> {
        let candidate_tags = self.deny_list.filter(focal_tags);
        if candidate_tags.is_empty() {
            debug!(plugin = %focal.plugin_id, "No usable tags, skipping similarity");
            return Ok(Vec::new());
        }

        // Dedupe ids before fetching records, a plugin sharing three tags is one fetch
        let ids: BTreeSet<String> = self
            .store
            .find_plugin_ids_by_tags(&candidate_tags, &focal.plugin_id)?
            .into_iter()
            .filter(|id| *id != focal.plugin_id)
            .collect();

        debug!(
            plugin = %focal.plugin_id,
            tags = candidate_tags.len(),
            candidates = ids.len(),
            "Resolved similar plugin ids"
        );

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut plugins = self.store.find_plugins_by_ids(&ids)?;
        plugins.retain(|p| p.plugin_id != focal.plugin_id);
        plugins.sort_by(|a, b| a.plugin_id.cmp(&b.plugin_id));
        plugins.dedup_by(|a, b| a.plugin_id == b.plugin_id);

        Ok(plugins)
    }
}
