//! Tag normalization

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// Slug used when a tag carries nothing usable
const FALLBACK_SLUG: &str = "untagged";

/// A normalized tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRecord {
    /// Display label
    pub label: String,
    /// URL-safe identifier used for links and lookup
    pub slug: String,
}

impl TagRecord {
    pub fn new(label: &str) -> Self {
        let label = label.trim();
        let slug = slug::slugify(label);
        Self {
            label: label.to_string(),
            slug: if slug.is_empty() {
                FALLBACK_SLUG.to_string()
            } else {
                slug
            },
        }
    }

    fn with_slug(label: &str, slug: &str) -> Self {
        let mut record = Self::new(label);
        let slug = slug::slugify(slug);
        if !slug.is_empty() {
            record.slug = slug;
        }
        record
    }
}

/// Known tags, consulted before a bare string is slugified
pub trait TagRegistry: Send + Sync {
    fn resolve(&self, token: &str) -> Option<TagRecord>;
}

/// Registry built from the `tag_map` config section (token -> label)
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    by_token: HashMap<String, TagRecord>,
    by_slug: HashMap<String, TagRecord>,
}

impl TagMap {
    pub fn new(map: &HashMap<String, String>) -> Self {
        let mut registry = Self::default();
        for (token, label) in map {
            let record = TagRecord::new(label);
            registry
                .by_slug
                .insert(slug::slugify(token), record.clone());
            registry.by_token.insert(token.clone(), record);
        }
        registry
    }
}

impl TagRegistry for TagMap {
    fn resolve(&self, token: &str) -> Option<TagRecord> {
        self.by_token
            .get(token)
            .or_else(|| self.by_slug.get(&slug::slugify(token)))
            .cloned()
    }
}

/// Turns raw front-matter tag values into [`TagRecord`]s.
///
/// Normalization is total: every input yields exactly one record.
#[derive(Default)]
pub struct TagNormalizer {
    registry: Option<Box<dyn TagRegistry>>,
}

impl TagNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: impl TagRegistry + 'static) -> Self {
        Self {
            registry: Some(Box::new(registry)),
        }
    }

    /// Normalize the whole `tags` field.
    ///
    /// A missing or null field is empty, a single scalar is a one-tag list,
    /// and a list keeps its length and order.
    pub fn normalize_all(&self, tags: Option<&Value>) -> Vec<TagRecord> {
        match tags {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.iter().map(|t| self.normalize(t)).collect(),
            Some(other) => vec![self.normalize(other)],
        }
    }

    /// Normalize one raw tag
    pub fn normalize(&self, raw: &Value) -> TagRecord {
        match raw {
            Value::String(s) => self.resolve_token(s).unwrap_or_else(|| fallback(raw)),
            Value::Number(n) => self.resolve_token(&n.to_string()).unwrap_or_else(|| fallback(raw)),
            Value::Bool(b) => self.resolve_token(&b.to_string()).unwrap_or_else(|| fallback(raw)),
            Value::Mapping(_) => from_mapping(raw).unwrap_or_else(|| fallback(raw)),
            Value::Tagged(tagged) => self.normalize(&tagged.value),
            Value::Null | Value::Sequence(_) => fallback(raw),
        }
    }

    fn resolve_token(&self, token: &str) -> Option<TagRecord> {
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        if let Some(record) = self.registry.as_ref().and_then(|r| r.resolve(token)) {
            return Some(record);
        }
        Some(TagRecord::new(token))
    }
}

/// `{name|label|title, slug|id}` shaped tags
fn from_mapping(raw: &Value) -> Option<TagRecord> {
    let field = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| raw.get(*k))
            .find_map(scalar_string)
            .filter(|s| !s.trim().is_empty())
    };

    let label = field(&["name", "label", "title"])?;
    Some(match field(&["slug", "id"]) {
        Some(slug) => TagRecord::with_slug(&label, &slug),
        None => TagRecord::new(&label),
    })
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Best-effort record for shapes nothing else understands
fn fallback(raw: &Value) -> TagRecord {
    tracing::debug!("Unrecognized tag shape, using fallback: {:?}", raw);
    let rendered = match raw {
        Value::Null => String::new(),
        other => serde_json::to_string(other).unwrap_or_default(),
    };
    let label = rendered.trim();
    if label.is_empty() || label == "\"\"" {
        TagRecord {
            label: FALLBACK_SLUG.to_string(),
            slug: FALLBACK_SLUG.to_string(),
        }
    } else {
        TagRecord::new(label)
    }
}
