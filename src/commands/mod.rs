//! CLI commands

pub mod list;
pub mod show;
pub mod tags;

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::ContentSite;

/// Where a command reads from: a content directory and its type label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub dir: PathBuf,
    pub content_type: String,
}

impl Target {
    /// Resolve a collection name, letting `--dir` / `--type` override it
    pub fn resolve(
        site: &ContentSite,
        collection: Option<&str>,
        dir: Option<PathBuf>,
        content_type: Option<String>,
    ) -> Result<Self> {
        let configured = match collection {
            Some(name) => Some(
                site.config
                    .collection(name)
                    .ok_or_else(|| anyhow!("Unknown collection: {}", name))?,
            ),
            None if dir.is_none() => site.config.collections.values().next(),
            None => None,
        };

        let dir = dir
            .or_else(|| configured.map(|c| PathBuf::from(&c.dir)))
            .ok_or_else(|| anyhow!("No collection configured; pass --dir"))?;
        let content_type = content_type
            .or_else(|| configured.map(|c| c.content_type.clone()))
            .unwrap_or_else(|| "post".to_string());

        Ok(Self { dir, content_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContentConfig;

    fn site() -> ContentSite {
        ContentSite::with_config("/tmp/site", ContentConfig::default())
    }

    #[test]
    fn test_resolve_collection() {
        let target = Target::resolve(&site(), Some("docs"), None, None).unwrap();
        assert_eq!(target.dir, PathBuf::from("docs"));
        assert_eq!(target.content_type, "doc");
    }

    #[test]
    fn test_resolve_defaults_to_first_collection() {
        let target = Target::resolve(&site(), None, None, None).unwrap();
        assert_eq!(target.dir, PathBuf::from("posts"));
        assert_eq!(target.content_type, "post");
    }

    #[test]
    fn test_resolve_overrides() {
        let target =
            Target::resolve(&site(), Some("posts"), None, Some("note".to_string())).unwrap();
        assert_eq!(target.dir, PathBuf::from("posts"));
        assert_eq!(target.content_type, "note");

        let target = Target::resolve(&site(), None, Some("drafts".into()), None).unwrap();
        assert_eq!(target.dir, PathBuf::from("drafts"));
        assert_eq!(target.content_type, "post");
    }

    #[test]
    fn test_resolve_unknown_collection() {
        assert!(Target::resolve(&site(), Some("nope"), None, None).is_err());
    }
}
