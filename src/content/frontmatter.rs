//! Front-matter parsing

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw front-matter metadata, in source key order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawFrontMatter {
    fields: IndexMap<String, serde_yaml::Value>,
}

impl RawFrontMatter {
    /// Split a file into front-matter and body.
    ///
    /// Never fails: if the metadata block is missing, unterminated or not
    /// parsable, the metadata is empty and the body is `content` unchanged.
    pub fn parse(content: &str) -> (Self, &str) {
        let trimmed = content.trim_start();

        // YAML front-matter (---)
        if trimmed.starts_with("---") {
            if let Some(parsed) = Self::parse_yaml(trimmed) {
                return parsed;
            }
        }

        // JSON front-matter (;;;)
        if let Some(rest) = trimmed.strip_prefix(";;;") {
            if let Some(parsed) = Self::parse_json(rest) {
                return parsed;
            }
        }

        (RawFrontMatter::default(), content)
    }

    fn parse_yaml(content: &str) -> Option<(Self, &str)> {
        let rest = open_delimiter(content, "---")?;
        let (yaml_end, body_start) = find_closing(rest, "---")?;
        let yaml_content = &rest[..yaml_end];
        let remaining = rest[body_start..].trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Some((RawFrontMatter::default(), remaining));
        }

        // A `---` pair around prose is a thematic break, not metadata
        if !has_yaml_structure(yaml_content) {
            return None;
        }

        match serde_yaml::from_str::<IndexMap<String, serde_yaml::Value>>(yaml_content) {
            Ok(fields) => Some((Self { fields }, remaining)),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse YAML front-matter, treating as content: {}",
                    e
                );
                None
            }
        }
    }

    fn parse_json(rest: &str) -> Option<(Self, &str)> {
        let end_pos = rest.find(";;;")?;
        let json_content = rest[..end_pos].trim();
        let remaining = rest[end_pos + 3..].trim_start_matches(['\n', '\r']);

        // the surrounding braces are optional
        let wrapped;
        let json_content = if json_content.starts_with('{') {
            json_content
        } else {
            wrapped = format!("{{{}}}", json_content);
            &wrapped
        };

        match serde_json::from_str::<IndexMap<String, serde_yaml::Value>>(json_content) {
            Ok(fields) => Some((Self { fields }, remaining)),
            Err(e) => {
                tracing::warn!(
                    "Failed to parse JSON front-matter, treating as content: {}",
                    e
                );
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.fields.get(key)
    }

    /// Remove a key, keeping the order of the remaining ones
    pub fn take(&mut self, key: &str) -> Option<serde_yaml::Value> {
        self.fields.shift_remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume into the ordered key/value map
    pub fn into_fields(self) -> IndexMap<String, serde_yaml::Value> {
        self.fields
    }

    /// Render the metadata as a `---` delimited YAML block
    pub fn to_block(&self) -> String {
        if self.is_empty() {
            return "---\n---\n".to_string();
        }
        let yaml = serde_yaml::to_string(&self.fields).unwrap_or_default();
        format!("---\n{}---\n", yaml)
    }
}

/// Strip an opening delimiter line, returning the text after it
fn open_delimiter<'a>(content: &'a str, marker: &str) -> Option<&'a str> {
    let rest = content.strip_prefix(marker)?;
    let line_end = rest.find('\n').unwrap_or(rest.len());
    if !rest[..line_end].trim().is_empty() {
        // `----` or `--- title` is not a delimiter
        return None;
    }
    Some(rest.get(line_end + 1..).unwrap_or(""))
}

/// Find the closing delimiter line. Returns (end of metadata, start of body).
fn find_closing(content: &str, marker: &str) -> Option<(usize, usize)> {
    let mut pos = 0;
    while pos <= content.len() {
        let line_len = content[pos..].find('\n');
        let line = match line_len {
            Some(n) => &content[pos..pos + n],
            None => &content[pos..],
        };
        if line.trim_end() == marker {
            let body_start = line_len.map_or(content.len(), |n| pos + n + 1);
            return Some((pos, body_start));
        }
        match line_len {
            Some(n) => pos += n + 1,
            None => break,
        }
    }
    None
}

/// Whether a block looks like `key: value` metadata rather than prose
fn has_yaml_structure(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some((key_is_valid, rest)) = split_key(trimmed) else {
            return false;
        };
        let Some(after_colon) = rest.strip_prefix(':') else {
            return false;
        };
        key_is_valid && (after_colon.is_empty() || after_colon.starts_with(' '))
    })
}

/// Split a line into its key and the text from the `:` on.
///
/// Quoted keys may hold anything, bare keys only identifier characters.
fn split_key(line: &str) -> Option<(bool, &str)> {
    if let Some(quote @ ('"' | '\'')) = line.chars().next() {
        let end = line[1..].find(quote)? + 1;
        return Some((true, &line[end + 1..]));
    }

    let colon_pos = line.find(':')?;
    let key = &line[..colon_pos];
    let is_valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "http" | "https" | "ftp");
    Some((is_valid, &line[colon_pos..]))
}
