//! Error types for the content pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a record or a collection.
///
/// Missing front matter, unparsable dates and odd tag shapes are not errors;
/// they degrade to empty metadata, an absent date and a fallback tag.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Content not found for slug '{slug}': {path:?}")]
    NotFound { slug: String, path: PathBuf },

    #[error("Failed to read '{slug}' from {path:?}: {source}")]
    Read {
        slug: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read content directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compile MDX for '{slug}': {message}")]
    Compile { slug: String, message: String },

    #[error("Content task failed: {0}")]
    Task(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ContentError {
    /// The slug this error is about, if it concerns a single file
    pub fn slug(&self) -> Option<&str> {
        match self {
            ContentError::NotFound { slug, .. }
            | ContentError::Read { slug, .. }
            | ContentError::Compile { slug, .. } => Some(slug),
            _ => None,
        }
    }
}

pub type Result<T, E = ContentError> = std::result::Result<T, E>;
