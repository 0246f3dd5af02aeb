//! Supporting types shared by the watcher, fetchers and decoders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque key partitioning the configuration namespace, one per chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BotType(String);

impl BotType {
    /// Create a bot type from any string-like value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BotType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BotType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BotType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One remote configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File name without its extension; the key callers read by.
    pub id: String,
    /// Full file name as listed in the remote tree.
    pub file_name: String,
    /// Extension including the leading dot, or empty.
    pub extension: String,
    /// Fetcher-assigned version marker (git blob oid). Only compared for equality.
    pub object_id: String,
    /// Raw file content.
    pub content: String,
}

impl File {
    /// Build a file from its remote name, splitting off the extension.
    ///
    /// `hello.yml` yields id `hello` and extension `.yml`. A name without a
    /// dot has an empty extension.
    pub fn from_entry(
        file_name: impl Into<String>,
        object_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let (id, extension) = split_name(&file_name);
        Self {
            id: id.to_string(),
            extension: extension.to_string(),
            file_name,
            object_id: object_id.into(),
            content: content.into(),
        }
    }
}

/// All files of one bot type, keyed by id.
pub type FileSet = HashMap<String, File>;

/// Split a file name at its last dot.
pub(crate) fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) => file_name.split_at(idx),
        None => (file_name, ""),
    }
}

/// Remote lookup location for one bot type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repository: String,
    /// Branch the tree is read from
    pub branch: String,
    /// Directory inside the repository, slash separated, without leading slash
    pub path: String,
}

impl Namespace {
    /// Build the namespace for `bot_type` under `base_dir`.
    pub fn new(
        owner: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
        base_dir: &str,
        bot_type: &BotType,
    ) -> Self {
        Self {
            owner: owner.into(),
            repository: repository.into(),
            branch: branch.into(),
            path: join_path(base_dir, bot_type.as_str()),
        }
    }

    /// Git object expression, e.g. `master:bot/config/slack`.
    pub fn expression(&self) -> String {
        format!("{}:{}", self.branch, self.path)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Join and clean slash-separated paths. `..` never climbs above the
/// repository root.
fn join_path(base: &str, leaf: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in base.split('/').chain(leaf.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_file_from_entry() {
        let file = File::from_entry("hello.yml", "abc", "message: hi");
        assert_eq!(file.id, "hello");
        assert_eq!(file.extension, ".yml");
        assert_eq!(file.file_name, "hello.yml");
        assert_eq!(file.object_id, "abc");
    }

    #[test]
    fn test_split_name_edge_cases() {
        assert_eq!(split_name("README"), ("README", ""));
        assert_eq!(split_name("a.b.json"), ("a.b", ".json"));
        assert_eq!(split_name(".hidden"), ("", ".hidden"));
    }

    #[test]
    fn test_namespace_path() {
        let bot = BotType::from("slackBot");
        let ns = Namespace::new("owner", "repo", "master", "bot/config", &bot);
        assert_eq!(ns.path, "bot/config/slackBot");
        assert_eq!(ns.expression(), "master:bot/config/slackBot");
        assert_eq!(ns.to_string(), "bot/config/slackBot");
    }

    #[test]
    fn test_namespace_trims_slashes() {
        let bot = BotType::from("slack");
        let ns = Namespace::new("o", "r", "main", "/config/", &bot);
        assert_eq!(ns.path, "config/slack");

        let ns = Namespace::new("o", "r", "main", "", &bot);
        assert_eq!(ns.path, "slack");

        let ns = Namespace::new("o", "r", "main", "bot/./old/../config", &bot);
        assert_eq!(ns.path, "bot/config/slack");

        let ns = Namespace::new("o", "r", "main", "../../config", &bot);
        assert_eq!(ns.path, "config/slack");
    }

    proptest! {
        #[test]
        fn prop_split_name_reassembles(stem in "[a-z]{0,8}", ext in "(\\.[a-z]{1,4})?") {
            let name = format!("{}{}", stem, ext);
            let (id, extension) = split_name(&name);
            prop_assert_eq!(format!("{}{}", id, extension), name.clone());
            prop_assert!(!extension.is_empty() || !id.contains('.'));
        }

        #[test]
        fn prop_namespace_has_no_empty_segments(base in "[a-z/]{0,16}", bot in "[a-z]{1,8}") {
            let ns = Namespace::new("o", "r", "b", &base, &BotType::new(bot.clone()));
            prop_assert!(!ns.path.starts_with('/'));
            prop_assert!(!ns.path.contains("//"));
            prop_assert!(ns.path.ends_with(&bot));
        }
    }
}
