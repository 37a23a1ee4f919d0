//! Show a single record

use anyhow::Result;

use super::Target;
use crate::ContentSite;

/// Print one record, compiled body included, as JSON
pub async fn run(site: &ContentSite, target: &Target, slug: &str) -> Result<()> {
    let record = site.load(slug, &target.dir, &target.content_type).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
