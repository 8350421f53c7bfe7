use crate::freshness::{NEW_PLUGIN_DAYS, UPDATES_WINDOW_DAYS};
use crate::tags::TagDenyList;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Loaded from the config file, CLI flags win over whatever is in there.
/// Every section is optional, a missing file is just the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub favorites: FavoritesConfig,
}

impl Config {
    /// Load config from default location, defaults if there's no file
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            // No config file? Use defaults
            Ok(Self::default())
        }
    }

    /// Get the config file path
    /// Uses XDG on Linux/macOS, AppData on Windows
    pub fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("plugscout");

        Ok(config_dir.join("config.toml"))
    }
}

/// Per-user data directory (catalog db, favorites)
pub(crate) fn data_dir() -> crate::Result<PathBuf> {
    Ok(dirs::data_dir()
        .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
        .join("plugscout"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CatalogConfig {
    /// SQLite catalog file (default: <data_dir>/plugscout/catalog.db)
    pub database_path: Option<PathBuf>,
}

impl CatalogConfig {
    pub fn database_path(&self) -> crate::Result<PathBuf> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join("catalog.db")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Age under which a plugin gets the "new" badge
    #[serde(default = "default_new_plugin_days")]
    pub new_plugin_days: i64,

    /// Trailing window of the updates feed
    #[serde(default = "default_updates_window_days")]
    pub updates_window_days: i64,

    /// Replaces the built-in deny-list when set
    #[serde(default)]
    pub tag_deny_list: Option<TagDenyList>,
}

fn default_new_plugin_days() -> i64 {
    NEW_PLUGIN_DAYS
}

fn default_updates_window_days() -> i64 {
    UPDATES_WINDOW_DAYS
}

impl DiscoveryConfig {
    pub fn deny_list(&self) -> TagDenyList {
        self.tag_deny_list.clone().unwrap_or_default()
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            new_plugin_days: default_new_plugin_days(),
            updates_window_days: default_updates_window_days(),
            tag_deny_list: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FavoritesConfig {
    /// Favorites file (default: <data_dir>/plugscout/favorites.json)
    pub path: Option<PathBuf>,
}

impl FavoritesConfig {
    pub fn backend(&self) -> crate::Result<crate::favorites::JsonFileBackend> {
        match &self.path {
            Some(path) => Ok(crate::favorites::JsonFileBackend::new(path)),
            None => crate::favorites::JsonFileBackend::default_location(),
        }
    }
}
