//! Content configuration (_content.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main content configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Root of all content directories, relative to the base directory
    pub source_dir: String,

    /// Named collections, in declaration order
    pub collections: IndexMap<String, CollectionConfig>,

    /// Raw tag token -> display label
    pub tag_map: HashMap<String, String>,

    pub mdx: MdxConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        let mut collections = IndexMap::new();
        collections.insert(
            "posts".to_string(),
            CollectionConfig {
                dir: "posts".to_string(),
                content_type: "post".to_string(),
            },
        );
        collections.insert(
            "docs".to_string(),
            CollectionConfig {
                dir: "docs".to_string(),
                content_type: "doc".to_string(),
            },
        );

        Self {
            source_dir: "content".to_string(),
            collections,
            tag_map: HashMap::new(),
            mdx: MdxConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl ContentConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: ContentConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Look up a collection by name
    pub fn collection(&self, name: &str) -> Option<&CollectionConfig> {
        self.collections.get(name)
    }
}

/// A directory of content files sharing one type label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Directory relative to `source_dir`
    pub dir: String,
    /// Label injected as `type` into every record's front matter
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Syntax extensions understood by the MDX compiler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MdxPlugin {
    Gfm,
    Footnotes,
    SmartPunctuation,
    HeadingAttributes,
    Math,
}

/// MDX compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MdxConfig {
    pub plugins: Vec<MdxPlugin>,
    pub highlight: HighlightConfig,
}

impl Default for MdxConfig {
    fn default() -> Self {
        Self {
            plugins: vec![
                MdxPlugin::Gfm,
                MdxPlugin::Footnotes,
                MdxPlugin::HeadingAttributes,
            ],
            highlight: HighlightConfig::default(),
        }
    }
}

impl MdxConfig {
    pub fn has(&self, plugin: MdxPlugin) -> bool {
        self.plugins.contains(&plugin)
    }
}

/// Code block highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
