// The "recent updates" feed
use crate::{freshness::is_recent_at, models::Plugin};
use chrono::{DateTime, Utc};

/// Plugins released within the last `threshold_days`, newest first
pub fn recent_releases<I>(plugins: I, threshold_days: i64) -> Vec<Plugin>
where
    I: IntoIterator<Item = Plugin>,
{
    recent_releases_at(plugins, threshold_days, Utc::now())
}

/// Same as `recent_releases` with a pinned clock
///
/// Plugins without a release are skipped. Equal release times fall back
/// to plugin id so the order is stable between renders.
pub fn recent_releases_at<I>(plugins: I, threshold_days: i64, now: DateTime<Utc>) -> Vec<Plugin>
where
    I: IntoIterator<Item = Plugin>,
{
    let mut releases: Vec<Plugin> = plugins
        .into_iter()
        .filter(|p| {
            p.latest_release_at
                .is_some_and(|at| is_recent_at(at, threshold_days, now))
        })
        .collect();

    releases.sort_by(|a, b| {
        b.latest_release_at
            .cmp(&a.latest_release_at)
            .then_with(|| a.plugin_id.cmp(&b.plugin_id))
    });

    releases
}
