// Tags that say nothing about what a plugin actually does
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Curated deny-list. Nearly every catalog entry carries one of these,
/// so matching on them would make everything "similar" to everything.
pub const DEFAULT_DENIED_TAGS: &[&str] = &[
    "obsidian",
    "obsidian-md",
    "obsidianmd",
    "obsidian-plugin",
    "obsidian-plugins",
    "obsidian-vault",
    "plugin",
    "plugins",
];

/// Tags excluded from similarity matching
///
/// Static configuration, not derived data. Comparison is exact, tags are
/// matched the way they are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagDenyList {
    tags: HashSet<String>,
}

impl TagDenyList {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// A deny-list that lets every tag through
    pub fn empty() -> Self {
        Self {
            tags: HashSet::new(),
        }
    }

    pub fn is_denied(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Keep only the tags that may be used for similarity
    pub fn filter<I, S>(&self, tags: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .map(|tag| tag.as_ref().to_string())
            .filter(|tag| !self.is_denied(tag))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

impl Default for TagDenyList {
    fn default() -> Self {
        Self::new(DEFAULT_DENIED_TAGS.iter().copied())
    }
}
