// Per-view data assembly: store rows in, annotated cards out
use crate::{
    catalog::CatalogStore,
    favorites::FavoritesStore,
    freshness::{self, is_recent_at, NEW_PLUGIN_DAYS},
    models::{Plugin, PluginCard, PluginLinks},
    similarity::SimilarityResolver,
    tags::TagDenyList,
    trending::is_trending,
    updates::recent_releases_at,
    Error, Result,
};
use chrono::{DateTime, Utc};
use tracing::info;

/// Everything the plugin detail view renders
#[derive(Debug, Clone)]
pub struct PluginPage {
    pub plugin: PluginCard,
    pub tags: Vec<String>,
    pub similar: Vec<PluginCard>,
    pub links: PluginLinks,
}

/// Everything the updates view renders
#[derive(Debug, Clone)]
pub struct UpdatesPage {
    pub threshold_days: i64,
    pub releases: Vec<PluginCard>,
}

/// Builds page data for one view
///
/// Every card it hands out shares the same favorites store, so the page
/// stays consistent when the user toggles a favorite anywhere on it.
pub struct PageAssembler<'a, S: CatalogStore + ?Sized> {
    store: &'a S,
    deny_list: &'a TagDenyList,
    favorites: FavoritesStore,
    new_plugin_days: i64,
    now: Option<DateTime<Utc>>,
}

impl<'a, S: CatalogStore + ?Sized> PageAssembler<'a, S> {
    pub fn new(store: &'a S, deny_list: &'a TagDenyList, favorites: FavoritesStore) -> Self {
        Self {
            store,
            deny_list,
            favorites,
            new_plugin_days: NEW_PLUGIN_DAYS,
            now: None,
        }
    }

    pub fn with_new_plugin_days(mut self, days: i64) -> Self {
        self.new_plugin_days = days;
        self
    }

    /// Pin the clock instead of reading it on every call
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn favorites(&self) -> &FavoritesStore {
        &self.favorites
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    /// Annotate a plugin for rendering
    pub fn card(&self, plugin: Plugin) -> PluginCard {
        let is_new = is_recent_at(plugin.created_at, self.new_plugin_days, self.now());
        let is_trending = is_trending(plugin.z_score_trending);
        PluginCard::new(plugin, is_new, is_trending, self.favorites.clone())
    }

    /// Detail page for `slug`
    ///
    /// Unknown slugs are `Error::NotFound` - no half-rendered page.
    pub fn plugin_page(&self, slug: &str) -> Result<PluginPage> {
        let plugin = self
            .store
            .find_plugin_by_id(slug)?
            .ok_or_else(|| Error::NotFound(slug.to_string()))?;

        let mut tags = self.store.find_tags_for_plugin(slug)?;
        tags.sort();
        tags.dedup();

        let similar = SimilarityResolver::new(self.store, self.deny_list)
            .similar(&plugin, tags.as_slice())?;

        info!(
            plugin = %slug,
            tags = tags.len(),
            similar = similar.len(),
            "Assembled plugin page"
        );

        let links = plugin.links();
        Ok(PluginPage {
            plugin: self.card(plugin),
            tags,
            similar: similar.into_iter().map(|p| self.card(p)).collect(),
            links,
        })
    }

    /// Updates feed for the last `threshold_days`
    pub fn updates_page(&self, threshold_days: i64) -> Result<UpdatesPage> {
        let now = self.now();
        let candidates = self
            .store
            .find_plugins_released_after(freshness::cutoff(threshold_days, now))?;

        let releases = recent_releases_at(candidates, threshold_days, now);
        info!(threshold_days, releases = releases.len(), "Assembled updates page");

        Ok(UpdatesPage {
            threshold_days,
            releases: releases.into_iter().map(|p| self.card(p)).collect(),
        })
    }

    /// Every slug that has a detail page
    pub fn catalog_paths(&self) -> Result<Vec<String>> {
        let mut ids = self.store.find_all_plugin_ids()?;
        ids.sort();
        Ok(ids)
    }
}
