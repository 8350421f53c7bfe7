use chrono::{DateTime, TimeZone, Utc};
use plugscout_core::{CatalogStore, Plugin};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use crate::error::StoreError;

const PLUGIN_COLUMNS: &str = "plugin_id, name, author, description, repo, stargazers, \
     total_downloads, latest_release, latest_release_at, latest_release_desc, created_at, \
     z_score_trending";

/// Plugin catalog on SQLite
///
/// SQLite was chosen because:
/// - Zero-config embedded database
/// - The whole catalog fits comfortably in one file
/// - Doesn't require a separate process
///
/// Timestamps are stored as unix milliseconds so range filters are plain
/// integer comparisons.
pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        // Initialize schema on first run
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS plugins (
                plugin_id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                author TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                repo TEXT NOT NULL,
                stargazers INTEGER NOT NULL DEFAULT 0,
                total_downloads INTEGER NOT NULL DEFAULT 0,
                latest_release TEXT,
                latest_release_at INTEGER,
                latest_release_desc TEXT,
                created_at INTEGER NOT NULL,
                z_score_trending REAL
            );

            CREATE TABLE IF NOT EXISTS plugin_tags (
                plugin_id TEXT NOT NULL REFERENCES plugins(plugin_id) ON DELETE CASCADE,
                tag TEXT NOT NULL,
                PRIMARY KEY (plugin_id, tag)
            );

            CREATE INDEX IF NOT EXISTS idx_plugin_tags_tag ON plugin_tags(tag);
            CREATE INDEX IF NOT EXISTS idx_plugins_latest_release_at ON plugins(latest_release_at);",
        )
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Insert a plugin or overwrite the existing row with the same id
    pub fn upsert_plugin(&self, plugin: &Plugin) -> Result<(), StoreError> {
        write_plugin(&self.conn, plugin)?;
        Ok(())
    }

    /// Replace a plugin's tags. The plugin has to exist already.
    pub fn set_tags<S: AsRef<str>>(&self, plugin_id: &str, tags: &[S]) -> Result<(), StoreError> {
        let tx = self.conn.unchecked_transaction()?;
        write_tags(&tx, plugin_id, tags)?;
        tx.commit()?;
        Ok(())
    }

    pub fn plugin_count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM plugins", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    fn plugin_by_id(&self, id: &str) -> Result<Option<Plugin>, StoreError> {
        let sql = format!("SELECT {} FROM plugins WHERE plugin_id = ?1", PLUGIN_COLUMNS);
        let plugin = self
            .conn
            .query_row(&sql, params![id], plugin_from_row)
            .optional()?;
        Ok(plugin)
    }

    fn plugins_by_ids(&self, ids: &BTreeSet<String>) -> Result<Vec<Plugin>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM plugins WHERE plugin_id IN ({}) ORDER BY plugin_id",
            PLUGIN_COLUMNS,
            placeholders(1, ids.len())
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let plugins = stmt
            .query_map(params_from_iter(ids.iter()), plugin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(requested = ids.len(), found = plugins.len(), "Fetched plugins by id");
        Ok(plugins)
    }

    fn all_plugin_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT plugin_id FROM plugins ORDER BY plugin_id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(ids)
    }

    fn tags_for_plugin(&self, id: &str) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM plugin_tags WHERE plugin_id = ?1 ORDER BY tag")?;
        let tags = stmt
            .query_map(params![id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(tags)
    }

    fn plugin_ids_by_tags(
        &self,
        tags: &BTreeSet<String>,
        excluding_id: &str,
    ) -> Result<Vec<String>, StoreError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT DISTINCT plugin_id FROM plugin_tags
             WHERE plugin_id <> ?1 AND tag IN ({})
             ORDER BY plugin_id",
            placeholders(2, tags.len())
        );
        let bound = std::iter::once(excluding_id).chain(tags.iter().map(String::as_str));

        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params_from_iter(bound), |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        debug!(tags = tags.len(), matches = ids.len(), "Looked up plugins by tag");
        Ok(ids)
    }

    fn plugins_released_after(&self, cutoff: DateTime<Utc>) -> Result<Vec<Plugin>, StoreError> {
        let sql = format!(
            "SELECT {} FROM plugins
             WHERE latest_release_at > ?1
             ORDER BY latest_release_at DESC, plugin_id",
            PLUGIN_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let plugins = stmt
            .query_map(params![timestamp_to_sql(&cutoff)], plugin_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(plugins)
    }
}

impl CatalogStore for CatalogDb {
    fn find_plugin_by_id(&self, id: &str) -> plugscout_core::Result<Option<Plugin>> {
        Ok(self.plugin_by_id(id)?)
    }

    fn find_plugins_by_ids(&self, ids: &BTreeSet<String>) -> plugscout_core::Result<Vec<Plugin>> {
        Ok(self.plugins_by_ids(ids)?)
    }

    fn find_all_plugin_ids(&self) -> plugscout_core::Result<Vec<String>> {
        Ok(self.all_plugin_ids()?)
    }

    fn find_tags_for_plugin(&self, id: &str) -> plugscout_core::Result<Vec<String>> {
        Ok(self.tags_for_plugin(id)?)
    }

    fn find_plugin_ids_by_tags(
        &self,
        tags: &BTreeSet<String>,
        excluding_id: &str,
    ) -> plugscout_core::Result<Vec<String>> {
        Ok(self.plugin_ids_by_tags(tags, excluding_id)?)
    }

    fn find_plugins_released_after(
        &self,
        cutoff: DateTime<Utc>,
    ) -> plugscout_core::Result<Vec<Plugin>> {
        Ok(self.plugins_released_after(cutoff)?)
    }
}

pub(crate) fn write_plugin(conn: &Connection, plugin: &Plugin) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO plugins (
            plugin_id, name, author, description, repo, stargazers, total_downloads,
            latest_release, latest_release_at, latest_release_desc, created_at, z_score_trending
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
        ON CONFLICT(plugin_id) DO UPDATE SET
            name = excluded.name,
            author = excluded.author,
            description = excluded.description,
            repo = excluded.repo,
            stargazers = excluded.stargazers,
            total_downloads = excluded.total_downloads,
            latest_release = excluded.latest_release,
            latest_release_at = excluded.latest_release_at,
            latest_release_desc = excluded.latest_release_desc,
            created_at = excluded.created_at,
            z_score_trending = excluded.z_score_trending",
        params![
            plugin.plugin_id,
            plugin.name,
            plugin.author,
            plugin.description,
            plugin.repo,
            count_to_sql(plugin.stargazers),
            count_to_sql(plugin.total_downloads),
            plugin.latest_release,
            plugin.latest_release_at.as_ref().map(timestamp_to_sql),
            plugin.latest_release_desc,
            timestamp_to_sql(&plugin.created_at),
            plugin.z_score_trending,
        ],
    )?;
    Ok(())
}

pub(crate) fn write_tags<S: AsRef<str>>(
    conn: &Connection,
    plugin_id: &str,
    tags: &[S],
) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM plugin_tags WHERE plugin_id = ?1", params![plugin_id])?;

    // OR IGNORE: the (plugin_id, tag) key already rules out duplicates
    let mut stmt =
        conn.prepare("INSERT OR IGNORE INTO plugin_tags (plugin_id, tag) VALUES (?1, ?2)")?;
    for tag in tags {
        stmt.execute(params![plugin_id, tag.as_ref()])?;
    }
    Ok(())
}

fn plugin_from_row(row: &Row<'_>) -> rusqlite::Result<Plugin> {
    let latest_release_at = match row.get::<_, Option<i64>>(8)? {
        Some(ms) => Some(timestamp_from_sql(8, ms)?),
        None => None,
    };

    Ok(Plugin {
        plugin_id: row.get(0)?,
        name: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
        repo: row.get(4)?,
        stargazers: count_from_sql(row.get(5)?),
        total_downloads: count_from_sql(row.get(6)?),
        latest_release: row.get(7)?,
        latest_release_at,
        latest_release_desc: row.get(9)?,
        created_at: timestamp_from_sql(10, row.get(10)?)?,
        z_score_trending: row.get(11)?,
    })
}

/// `?start, ?start+1, ...` for an IN list of `count` values
fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn timestamp_to_sql(at: &DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn timestamp_from_sql(column: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, ms))
}

fn count_to_sql(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn count_from_sql(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use plugscout_core::Error;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn plugin(id: &str) -> Plugin {
        Plugin {
            plugin_id: id.to_string(),
            name: format!("{} plugin", id),
            author: "someone".to_string(),
            description: format!("Does {} things", id),
            repo: format!("someone/obsidian-{}", id),
            stargazers: 42,
            total_downloads: 12_345,
            latest_release: Some("1.2.3".to_string()),
            latest_release_at: Some(now() - Duration::days(3)),
            latest_release_desc: Some("## Fixes\n- stuff".to_string()),
            created_at: now() - Duration::days(200),
            z_score_trending: Some(11.5),
        }
    }

    fn tag_set(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_plugin_roundtrip() {
        let db = CatalogDb::open_in_memory().unwrap();
        let original = plugin("tasks");
        db.upsert_plugin(&original).unwrap();

        let loaded = db.find_plugin_by_id("tasks").unwrap();
        assert_eq!(loaded, Some(original));
        assert_eq!(db.find_plugin_by_id("missing").unwrap(), None);
    }

    #[test]
    fn test_nullable_columns() {
        let db = CatalogDb::open_in_memory().unwrap();
        let mut bare = plugin("bare");
        bare.latest_release = None;
        bare.latest_release_at = None;
        bare.latest_release_desc = None;
        bare.z_score_trending = None;
        db.upsert_plugin(&bare).unwrap();

        assert_eq!(db.find_plugin_by_id("bare").unwrap(), Some(bare));
    }

    #[test]
    fn test_upsert_overwrites() {
        let db = CatalogDb::open_in_memory().unwrap();
        db.upsert_plugin(&plugin("tasks")).unwrap();

        let mut updated = plugin("tasks");
        updated.stargazers = 9000;
        db.upsert_plugin(&updated).unwrap();

        assert_eq!(db.plugin_count().unwrap(), 1);
        assert_eq!(db.find_plugin_by_id("tasks").unwrap().unwrap().stargazers, 9000);
    }

    #[test]
    fn test_tags_are_replaced_and_deduplicated() {
        let db = CatalogDb::open_in_memory().unwrap();
        db.upsert_plugin(&plugin("tasks")).unwrap();

        db.set_tags("tasks", &["todo", "gtd", "todo"]).unwrap();
        assert_eq!(db.find_tags_for_plugin("tasks").unwrap(), vec!["gtd", "todo"]);

        db.set_tags("tasks", &["productivity"]).unwrap();
        assert_eq!(db.find_tags_for_plugin("tasks").unwrap(), vec!["productivity"]);
    }

    #[test]
    fn test_tags_need_an_existing_plugin() {
        let db = CatalogDb::open_in_memory().unwrap();
        assert!(db.set_tags("ghost", &["ui"]).is_err());
    }

    #[test]
    fn test_ids_by_tags_are_distinct_and_exclude_focal() {
        let db = CatalogDb::open_in_memory().unwrap();
        for id in ["a", "b", "c", "d"] {
            db.upsert_plugin(&plugin(id)).unwrap();
        }
        db.set_tags("a", &["react", "ui"]).unwrap();
        db.set_tags("b", &["react", "ui", "charts"]).unwrap();
        db.set_tags("c", &["ui"]).unwrap();
        db.set_tags("d", &["cli"]).unwrap();

        let ids = db
            .find_plugin_ids_by_tags(&tag_set(&["react", "ui"]), "a")
            .unwrap();
        assert_eq!(ids, vec!["b", "c"]);

        assert!(db
            .find_plugin_ids_by_tags(&BTreeSet::new(), "a")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_plugins_by_ids() {
        let db = CatalogDb::open_in_memory().unwrap();
        for id in ["a", "b", "c"] {
            db.upsert_plugin(&plugin(id)).unwrap();
        }

        let found = db.find_plugins_by_ids(&tag_set(&["c", "a", "zzz"])).unwrap();
        let ids: Vec<_> = found.iter().map(|p| p.plugin_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert!(db.find_plugins_by_ids(&BTreeSet::new()).unwrap().is_empty());
    }

    #[test]
    fn test_released_after_is_strict() {
        let db = CatalogDb::open_in_memory().unwrap();
        let cutoff = now() - Duration::days(10);

        let mut on_cutoff = plugin("edge");
        on_cutoff.latest_release_at = Some(cutoff);
        let mut inside = plugin("inside");
        inside.latest_release_at = Some(cutoff + Duration::seconds(1));
        let mut unreleased = plugin("draft");
        unreleased.latest_release_at = None;

        for p in [&on_cutoff, &inside, &unreleased] {
            db.upsert_plugin(p).unwrap();
        }

        let released = db.find_plugins_released_after(cutoff).unwrap();
        let ids: Vec<_> = released.iter().map(|p| p.plugin_id.as_str()).collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[test]
    fn test_all_ids_sorted() {
        let db = CatalogDb::open_in_memory().unwrap();
        for id in ["zotero", "admonition", "kanban"] {
            db.upsert_plugin(&plugin(id)).unwrap();
        }
        assert_eq!(
            db.find_all_plugin_ids().unwrap(),
            vec!["admonition", "kanban", "zotero"]
        );
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("catalog.db");

        {
            let db = CatalogDb::open(&path).unwrap();
            db.upsert_plugin(&plugin("tasks")).unwrap();
        }

        let db = CatalogDb::open(&path).unwrap();
        assert_eq!(db.plugin_count().unwrap(), 1);
    }

    #[test]
    fn test_store_errors_surface_as_unavailable() {
        let db = CatalogDb::open_in_memory().unwrap();
        db.conn().execute_batch("DROP TABLE plugin_tags").unwrap();

        let err = db.find_tags_for_plugin("tasks").unwrap_err();
        assert!(matches!(err, Error::DataStoreUnavailable(_)));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1, 3), "?1, ?2, ?3");
        assert_eq!(placeholders(2, 1), "?2");
    }
}
