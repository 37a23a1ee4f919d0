//! List a content collection

use anyhow::Result;

use super::Target;
use crate::content::LoadMode;
use crate::ContentSite;

/// Print a collection, newest first
pub async fn run(site: &ContentSite, target: &Target, full: bool, json: bool) -> Result<()> {
    let mode = if full { LoadMode::Full } else { LoadMode::Slim };
    let records = site
        .load_all(&target.dir, &target.content_type, mode)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("{} ({}):", target.content_type, records.len());
    for record in &records {
        let date = record
            .date()
            .map(|d| d.format("%Y-%m-%d"))
            .unwrap_or_else(|| "----------".to_string());
        let title = record.frontmatter.title.as_deref().unwrap_or("Untitled");
        println!("  {} - {} [{}]", date, title, record.slug);
    }

    Ok(())
}
