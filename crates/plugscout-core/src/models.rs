use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::favorites::FavoritesStore;

/// Plugin model - one catalog entry, straight from the ingestion job
///
/// Field names serialize in camelCase so catalog dumps from the
/// ingestion side can be imported as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub plugin_id: String,
    pub name: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// `owner/repository` on GitHub
    pub repo: String,
    #[serde(default)]
    pub stargazers: u64,
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub latest_release: Option<String>,
    #[serde(default)]
    pub latest_release_at: Option<DateTime<Utc>>,
    /// Changelog of the latest release, markdown
    #[serde(default)]
    pub latest_release_desc: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub z_score_trending: Option<f64>,
}

impl Plugin {
    pub fn links(&self) -> PluginLinks {
        let repo_url = format!("https://github.com/{}", self.repo);
        PluginLinks {
            release_url: self
                .latest_release
                .as_ref()
                .map(|tag| format!("{}/releases/tag/{}", repo_url, tag)),
            releases_url: format!("{}/releases", repo_url),
            repo_url,
        }
    }
}

/// Outbound links shown on a plugin page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginLinks {
    pub repo_url: String,
    pub release_url: Option<String>,
    pub releases_url: String,
}

/// A plugin annotated for rendering
///
/// `is_new` and `is_trending` are computed when the card is built.
/// Favorite status is read through the shared store on every call, so a
/// toggle on any card shows up on every other card of the same view.
#[derive(Debug, Clone)]
pub struct PluginCard {
    pub plugin: Plugin,
    pub is_new: bool,
    pub is_trending: bool,
    favorites: FavoritesStore,
}

impl PluginCard {
    pub fn new(plugin: Plugin, is_new: bool, is_trending: bool, favorites: FavoritesStore) -> Self {
        Self {
            plugin,
            is_new,
            is_trending,
            favorites,
        }
    }

    pub fn is_favorite(&self) -> bool {
        self.favorites.is_favorite(&self.plugin.plugin_id)
    }

    /// Flip favorite status, returns the new status
    pub fn toggle_favorite(&self) -> bool {
        self.favorites.toggle(&self.plugin.plugin_id)
    }
}
