//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers built once at startup and passed to each component.
//! - Rule sections are ordered lists, never hash maps: lookups are first-match
//!   in declaration order.

use std::fmt;
use std::path::PathBuf;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Complete configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Torrent client connection settings.
    #[serde(rename = "qbt")]
    pub client: ClientConfig,
    /// Managed directories.
    #[serde(default)]
    pub directory: DirectoryConfig,
    /// Category rules: category name to save-path substring.
    #[serde(rename = "cat", default)]
    pub categories: RuleList,
    /// Tag rules: tracker-URL substring to tag.
    #[serde(default)]
    pub tags: RuleList,
}

/// Connection settings for the torrent client Web API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Host, with or without scheme (`localhost:8080`, `https://qbt.lan`).
    pub host: String,
    /// Web UI user name.
    #[serde(rename = "user", default)]
    pub username: Option<String>,
    /// Web UI password.
    #[serde(rename = "pass", default)]
    pub password: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Host with an `http://` scheme added when none was configured.
    #[must_use]
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("http://{host}")
        }
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Directories managed by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DirectoryConfig {
    /// Drop directory written by the external cross-seed tool.
    #[serde(default)]
    pub cross_seed: Option<PathBuf>,
    /// Content root as seen by the torrent client.
    #[serde(default)]
    pub root_dir: Option<PathBuf>,
    /// Same root as seen by this process, when it differs from `root_dir`.
    #[serde(default)]
    pub remote_dir: Option<PathBuf>,
}

/// Single `key: value` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Rule key as written in the file.
    pub key: String,
    /// Rule value; empty when the file left it blank.
    pub value: String,
}

impl Rule {
    /// Construct a rule.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered rule section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleList(Vec<Rule>);

impl RuleList {
    /// Build a list from rules in priority order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self(rules)
    }

    /// Iterate rules in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }

    /// Number of rules.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the section declares no rules.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RuleList
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| Rule::new(key, value))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'de> Deserialize<'de> for RuleList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(RuleListVisitor)
    }
}

struct RuleListVisitor;

impl<'de> Visitor<'de> for RuleListVisitor {
    type Value = RuleList;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a mapping of rule keys to string values")
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RuleList::default())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(RuleList::default())
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Option<String>>()? {
            rules.push(Rule::new(key, value.unwrap_or_default()));
        }
        Ok(RuleList(rules))
    }
}
