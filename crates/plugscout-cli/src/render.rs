// Plain terminal rendering of assembled pages
use chrono::{DateTime, Utc};
use plugscout_core::{PluginCard, PluginPage, UpdatesPage};
use termimad::MadSkin;

/// Badge strip for a card: favorite, new, trending
pub fn badges(card: &PluginCard) -> String {
    let mut badges = Vec::new();
    if card.is_favorite() {
        badges.push("🤩");
    }
    if card.is_new {
        badges.push("🥳");
    }
    if card.is_trending {
        badges.push("🔥");
    }
    badges.join(" ")
}

/// `12345` -> `12,345`
pub fn format_downloads(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Human-friendly age, e.g. "3 days ago"
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    format_duration_friendly((now - at).num_days().max(0))
}

fn format_duration_friendly(days: i64) -> String {
    if days == 0 {
        "Today".to_string()
    } else if days == 1 {
        "1 day ago".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else if days < 30 {
        plural(days / 7, "week")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

/// Changelog markdown to styled terminal text
pub fn markdown_to_terminal(markdown: &str) -> String {
    MadSkin::default().term_text(markdown).to_string()
}

pub fn updates_heading(count: usize, threshold_days: i64) -> String {
    let noun = if count == 1 { "update" } else { "updates" };
    let window = if threshold_days == 1 {
        "day".to_string()
    } else {
        format!("{} days", threshold_days)
    };
    format!("{} plugin {} in the last {}", count, noun, window)
}

fn card_line(card: &PluginCard) -> String {
    let badges = badges(card);
    let mut line = format!("{} ({})", card.plugin.name, card.plugin.plugin_id);
    if !badges.is_empty() {
        line.push(' ');
        line.push_str(&badges);
    }
    line
}

pub fn plugin_page(page: &PluginPage, now: DateTime<Utc>) -> String {
    let plugin = &page.plugin.plugin;
    let mut lines = vec![
        card_line(&page.plugin),
        format!(
            "by {} | {} downloads | {} stars",
            plugin.author,
            format_downloads(plugin.total_downloads),
            format_downloads(plugin.stargazers)
        ),
    ];

    if !plugin.description.is_empty() {
        lines.push(String::new());
        lines.push(plugin.description.clone());
    }

    if let Some(version) = &plugin.latest_release {
        lines.push(String::new());
        match plugin.latest_release_at {
            Some(at) => lines.push(format!("Latest release: {} ({})", version, format_relative(at, now))),
            None => lines.push(format!("Latest release: {}", version)),
        }
        if let Some(changelog) = &plugin.latest_release_desc {
            lines.push(markdown_to_terminal(changelog));
        }
    }

    if !page.tags.is_empty() {
        lines.push(String::new());
        lines.push(format!("Tags: {}", page.tags.join(", ")));
    }

    lines.push(String::new());
    lines.push(format!("Repository: {}", page.links.repo_url));
    if let Some(release_url) = &page.links.release_url {
        lines.push(format!("Release: {}", release_url));
    }
    lines.push(format!("All releases: {}", page.links.releases_url));

    if !page.similar.is_empty() {
        lines.push(String::new());
        lines.push("Similar plugins:".to_string());
        for card in &page.similar {
            lines.push(format!("  - {}", card_line(card)));
        }
    }

    lines.join("\n")
}

pub fn updates_page(page: &UpdatesPage, now: DateTime<Utc>) -> String {
    let mut lines = vec![updates_heading(page.releases.len(), page.threshold_days)];

    for card in &page.releases {
        let plugin = &card.plugin;
        let when = plugin
            .latest_release_at
            .map(|at| format_relative(at, now))
            .unwrap_or_default();
        lines.push(String::new());
        lines.push(format!(
            "{} {} - {}",
            card_line(card),
            plugin.latest_release.as_deref().unwrap_or("?"),
            when
        ));
        if let Some(changelog) = &plugin.latest_release_desc {
            lines.push(markdown_to_terminal(changelog));
        }
    }

    lines.join("\n")
}
