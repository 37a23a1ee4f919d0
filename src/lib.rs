//! mdx-content: loads MDX content for a blog or documentation site
//!
//! Reads `.mdx` files, normalizes their front-matter (dates, tags, type
//! label), compiles the body and returns date-ordered collections for
//! listing pages or single records for article pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;

use anyhow::Result;
use std::path::{Path, PathBuf};

pub use content::{ContentRecord, LoadMode};
pub use error::ContentError;

/// Configuration file looked up in the base directory
pub const CONFIG_FILE: &str = "_content.yml";

/// A content tree rooted at a base directory
#[derive(Clone)]
pub struct ContentSite {
    /// Content configuration
    pub config: config::ContentConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Root of the content directories
    pub source_dir: PathBuf,
    loader: content::ContentLoader,
}

impl ContentSite {
    /// Open a content tree, reading `_content.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join(CONFIG_FILE);

        let config = if config_path.exists() {
            tracing::debug!("Loading config from {:?}", config_path);
            config::ContentConfig::load(&config_path)?
        } else {
            config::ContentConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::ContentConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = base_dir.join(&config.source_dir);
        let loader = content::ContentLoader::from_config(&config);

        Self {
            config,
            base_dir,
            source_dir,
            loader,
        }
    }

    /// Resolve a content directory; relative paths are under `source_dir`
    pub fn content_dir<P: AsRef<Path>>(&self, directory: P) -> PathBuf {
        self.source_dir.join(directory)
    }

    /// Load one record by slug
    pub async fn load(
        &self,
        slug: &str,
        directory: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<ContentRecord, ContentError> {
        self.loader
            .load(slug, self.content_dir(directory), content_type)
            .await
    }

    /// Load a whole directory, newest first
    pub async fn load_all(
        &self,
        directory: impl AsRef<Path>,
        content_type: &str,
        mode: LoadMode,
    ) -> Result<Vec<ContentRecord>, ContentError> {
        self.loader
            .load_all(self.content_dir(directory), content_type, mode)
            .await
    }

    /// Load a configured collection by name
    pub async fn load_collection(
        &self,
        name: &str,
        mode: LoadMode,
    ) -> Result<Vec<ContentRecord>, ContentError> {
        let collection = self
            .config
            .collection(name)
            .ok_or_else(|| ContentError::Config(format!("Unknown collection: {}", name)))?;
        self.load_all(&collection.dir, &collection.content_type, mode)
            .await
    }
}
