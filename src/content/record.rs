//! Content record models

use indexmap::IndexMap;
use serde::Serialize;
use serde_yaml::Value;

use super::date::{parse_date, UtcDate};
use super::frontmatter::RawFrontMatter;
use super::mdx::CompiledBody;
use super::tags::{TagNormalizer, TagRecord};

/// Whether aggregated records keep their compiled body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Drop the compiled body, for listing pages
    Slim,
    /// Keep the compiled body
    Full,
}

/// One loaded content file
#[derive(Debug, Clone, Serialize)]
pub struct ContentRecord {
    /// File name without the `.mdx` extension
    pub slug: String,

    pub frontmatter: Frontmatter,

    /// Raw body text, after the front-matter block
    pub content: String,

    /// Compiled body; `None` in slim collections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<CompiledBody>,
}

impl ContentRecord {
    /// Drop the compiled body
    pub fn into_slim(mut self) -> Self {
        self.source = None;
        self
    }

    pub fn date(&self) -> Option<UtcDate> {
        self.frontmatter.date
    }
}

/// Normalized front-matter of a [`ContentRecord`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frontmatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Absent when the source date is missing or unparsable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<UtcDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Content type label supplied by the caller
    #[serde(rename = "type")]
    pub content_type: String,

    pub tags: Vec<TagRecord>,

    /// Other keys in source order, including known keys whose value was
    /// not a plain string (e.g. an `author` mapping)
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Frontmatter {
    /// Normalize raw metadata.
    ///
    /// `content_type` always replaces a `type` key from the file.
    pub fn from_raw(mut raw: RawFrontMatter, content_type: &str, tags: &TagNormalizer) -> Self {
        let date = raw.take("date").as_ref().and_then(parse_date);
        let tags = tags.normalize_all(raw.take("tags").as_ref());
        raw.take("type");

        Self {
            title: take_string(&mut raw, "title"),
            subtitle: take_string(&mut raw, "subtitle"),
            date,
            cover_image: take_string(&mut raw, "coverImage"),
            author: take_string(&mut raw, "author"),
            content_type: content_type.to_string(),
            tags,
            extra: raw.into_fields(),
        }
    }
}

/// Remove `key` if it holds a string; other shapes stay in place
fn take_string(raw: &mut RawFrontMatter, key: &str) -> Option<String> {
    if !matches!(raw.get(key), Some(Value::String(_))) {
        return None;
    }
    match raw.take(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontmatter(source: &str, content_type: &str) -> Frontmatter {
        let (raw, _) = RawFrontMatter::parse(source);
        Frontmatter::from_raw(raw, content_type, &TagNormalizer::new())
    }

    #[test]
    fn test_known_fields() {
        let fm = frontmatter(
            "---\ntitle: Hello\nsubtitle: World\ndate: 2021-05-01\ncoverImage: /c.png\nauthor: Jane\ntags: [api]\n---\n",
            "post",
        );
        assert_eq!(fm.title.as_deref(), Some("Hello"));
        assert_eq!(fm.subtitle.as_deref(), Some("World"));
        assert_eq!(fm.cover_image.as_deref(), Some("/c.png"));
        assert_eq!(fm.author.as_deref(), Some("Jane"));
        assert_eq!(fm.date.unwrap().to_string(), "Sat, 01 May 2021 00:00:00 GMT");
        assert_eq!(fm.tags, vec![TagRecord::new("api")]);
        assert!(fm.extra.is_empty());
    }

    #[test]
    fn test_type_label_overrides_file() {
        let fm = frontmatter("---\ntitle: T\ntype: draft\n---\n", "article");
        assert_eq!(fm.content_type, "article");
        assert!(!fm.extra.contains_key("type"));
    }

    #[test]
    fn test_missing_tags_and_metadata() {
        let fm = frontmatter("No front matter at all", "doc");
        assert!(fm.tags.is_empty());
        assert!(fm.date.is_none());
        assert_eq!(fm.content_type, "doc");

        let json = serde_json::to_value(&fm).unwrap();
        assert_eq!(json["tags"], serde_json::json!([]));
        assert_eq!(json["type"], "doc");
    }

    #[test]
    fn test_invalid_date_is_absent() {
        for raw in ["not-a-date", "''", "Invalid Date"] {
            let fm = frontmatter(&format!("---\ntitle: x\ndate: {}\n---\n", raw), "post");
            assert!(fm.date.is_none());
            let json = serde_json::to_value(&fm).unwrap();
            assert!(json.get("date").is_none(), "date leaked for {}", raw);
        }
    }

    #[test]
    fn test_extra_keys_preserved_in_order() {
        let fm = frontmatter(
            "---\ntitle: x\nzeta: 1\nauthor:\n  name: Jane\n  picture: /j.png\nalpha: [a, b]\n---\n",
            "post",
        );
        assert!(fm.author.is_none());
        let keys: Vec<_> = fm.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "author", "alpha"]);

        let json = serde_json::to_value(&fm).unwrap();
        assert_eq!(json["author"]["name"], "Jane");
        assert_eq!(json["alpha"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_serialized_field_names() {
        let fm = frontmatter("---\ncoverImage: /c.png\ndate: 2020-01-01\n---\n", "post");
        let json = serde_json::to_value(&fm).unwrap();
        assert_eq!(json["coverImage"], "/c.png");
        assert_eq!(json["date"], "Wed, 01 Jan 2020 00:00:00 GMT");
        assert!(json.get("title").is_none());
    }
}
