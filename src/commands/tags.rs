//! Tag usage across a collection

use anyhow::Result;
use std::collections::HashMap;

use super::Target;
use crate::content::{ContentRecord, LoadMode, TagRecord};
use crate::ContentSite;

/// Count tag usage by slug, most used first, ties by label
pub fn count_tags(records: &[ContentRecord]) -> Vec<(TagRecord, usize)> {
    let mut counts: HashMap<&str, (&TagRecord, usize)> = HashMap::new();
    for record in records {
        for tag in &record.frontmatter.tags {
            counts.entry(tag.slug.as_str()).or_insert((tag, 0)).1 += 1;
        }
    }

    let mut tags: Vec<_> = counts
        .into_values()
        .map(|(tag, count)| (tag.clone(), count))
        .collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.label.cmp(&b.0.label)));
    tags
}

/// Print tag counts for a collection
pub async fn run(site: &ContentSite, target: &Target) -> Result<()> {
    let records = site
        .load_all(&target.dir, &target.content_type, LoadMode::Slim)
        .await?;
    let tags = count_tags(&records);

    println!("Tags ({}):", tags.len());
    for (tag, count) in tags {
        println!("  {} [{}] ({})", tag.label, tag.slug, count);
    }

    Ok(())
}
