//! Content loader - builds records from MDX files and aggregates directories

use std::io;
use std::path::Path;
use std::sync::Arc;

use tokio::task::JoinSet;
use walkdir::WalkDir;

use super::{
    ContentRecord, Frontmatter, LoadMode, MarkdownCompiler, MdxCompiler, RawFrontMatter, TagMap,
    TagNormalizer,
};
use crate::config::ContentConfig;
use crate::error::{ContentError, Result};

/// Extension of content source files
pub const MDX_EXTENSION: &str = "mdx";

/// Loads content records from disk.
///
/// Cheap to clone; the compiler and tag normalizer are shared.
#[derive(Clone)]
pub struct ContentLoader {
    compiler: Arc<dyn MdxCompiler>,
    tags: Arc<TagNormalizer>,
}

impl ContentLoader {
    pub fn new(compiler: impl MdxCompiler + 'static, tags: TagNormalizer) -> Self {
        Self {
            compiler: Arc::new(compiler),
            tags: Arc::new(tags),
        }
    }

    /// Create a loader using the configured MDX plugins and tag map
    pub fn from_config(config: &ContentConfig) -> Self {
        Self::new(
            MarkdownCompiler::with_config(config.mdx.clone()),
            TagNormalizer::with_registry(TagMap::new(&config.tag_map)),
        )
    }

    /// Build the record for `<directory>/<slug>.mdx`.
    ///
    /// A trailing `.mdx` on `slug` is ignored. The record always carries
    /// its compiled body.
    pub async fn load(
        &self,
        slug: &str,
        directory: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<ContentRecord> {
        let slug = normalize_slug(slug);
        let path = directory
            .as_ref()
            .join(format!("{}.{}", slug, MDX_EXTENSION));

        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(ContentError::NotFound {
                    slug: slug.to_string(),
                    path,
                });
            }
            Err(source) => {
                return Err(ContentError::Read {
                    slug: slug.to_string(),
                    path,
                    source,
                });
            }
        };

        let (raw, body) = RawFrontMatter::parse(&text);
        let frontmatter = Frontmatter::from_raw(raw, content_type, &self.tags);
        let content = body.to_string();

        // syntect highlighting is CPU bound
        let compiler = Arc::clone(&self.compiler);
        let body = content.clone();
        let compiled = tokio::task::spawn_blocking(move || compiler.compile(&body))
            .await
            .map_err(|e| ContentError::Task(format!("compiling '{}': {}", slug, e)))?
            .map_err(|e| ContentError::Compile {
                slug: slug.to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!("Loaded {:?} ({} tags)", path, frontmatter.tags.len());

        Ok(ContentRecord {
            slug: slug.to_string(),
            frontmatter,
            content,
            source: Some(compiled),
        })
    }

    /// Load every `.mdx` file in `directory`, newest first.
    ///
    /// Files are loaded concurrently. The first failure aborts the whole
    /// collection. Records with equal dates keep file name order and records
    /// without a date come last.
    pub async fn load_all(
        &self,
        directory: impl AsRef<Path>,
        content_type: &str,
        mode: LoadMode,
    ) -> Result<Vec<ContentRecord>> {
        let directory = directory.as_ref();
        let slugs = list_slugs(directory)?;

        let mut tasks = JoinSet::new();
        for (index, slug) in slugs.into_iter().enumerate() {
            let loader = self.clone();
            let directory = directory.to_path_buf();
            let content_type = content_type.to_string();
            tasks.spawn(async move {
                loader
                    .load(&slug, &directory, &content_type)
                    .await
                    .map(|record| (index, record))
            });
        }

        // Returning early drops the set, which aborts the remaining tasks
        let mut loaded = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let entry = joined.map_err(|e| ContentError::Task(e.to_string()))??;
            loaded.push(entry);
        }

        loaded.sort_by_key(|(index, _)| *index);
        let mut records: Vec<ContentRecord> =
            loaded.into_iter().map(|(_, record)| record).collect();
        sort_by_date(&mut records);

        if mode == LoadMode::Slim {
            records = records.into_iter().map(ContentRecord::into_slim).collect();
        }

        tracing::info!(
            "Loaded {} {} record(s) from {:?}",
            records.len(),
            content_type,
            directory
        );

        Ok(records)
    }
}

/// Strip a trailing `.mdx` so the path never gets a double extension
pub fn normalize_slug(slug: &str) -> &str {
    slug.strip_suffix(".mdx").unwrap_or(slug)
}

/// Newest first; stable, undated records last
pub fn sort_by_date(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| b.date().cmp(&a.date()));
}

/// Slugs of the `.mdx` files directly inside `directory`, by file name
fn list_slugs(directory: &Path) -> Result<Vec<String>> {
    if !directory.is_dir() {
        return Err(ContentError::Directory {
            path: directory.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a directory"),
        });
    }

    let mut slugs = Vec::new();
    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| ContentError::Directory {
            path: directory.to_path_buf(),
            source: e.into(),
        })?;
        let path = entry.path();

        if !entry.file_type().is_file() || !is_mdx_file(path) {
            tracing::debug!("Skipping {:?}", path);
            continue;
        }

        // A slug has to round-trip into a path and into JSON
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            tracing::warn!("Content file name is not valid UTF-8: {:?}", path);
            return Err(ContentError::Directory {
                path: directory.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("file name is not valid UTF-8: {:?}", path),
                ),
            });
        };
        slugs.push(stem.to_string());
    }

    Ok(slugs)
}

/// Check if a file is an MDX file
fn is_mdx_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == MDX_EXTENSION)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{CompileFailure, CompiledBody, TagRecord};
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        fs::write(dir.join(name), content).unwrap();
    }

    fn post(date: &str, extra: &str) -> String {
        format!("---\ntitle: Post\ndate: {}\n{}---\n\nBody text.\n", date, extra)
    }

    fn loader() -> ContentLoader {
        ContentLoader::new(MarkdownCompiler::new(), TagNormalizer::new())
    }

    fn slugs(records: &[ContentRecord]) -> Vec<&str> {
        records.iter().map(|r| r.slug.as_str()).collect()
    }

    /// Compiler stub that returns the body verbatim
    struct EchoCompiler;

    impl MdxCompiler for EchoCompiler {
        fn compile(&self, source: &str) -> std::result::Result<CompiledBody, CompileFailure> {
            Ok(CompiledBody {
                compiled_source: source.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_slim_scenario() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "post-a.mdx", &post("2021-05-01", "tags: [\"api\"]\n"));
        write(dir.path(), "post-b.mdx", &post("2022-01-10", ""));

        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap();

        assert_eq!(slugs(&records), vec!["post-b", "post-a"]);
        assert!(records[0].frontmatter.tags.is_empty());
        assert_eq!(
            records[1].frontmatter.tags,
            vec![TagRecord {
                label: "api".to_string(),
                slug: "api".to_string()
            }]
        );
        assert!(records.iter().all(|r| r.source.is_none()));
        assert!(records.iter().all(|r| r.frontmatter.content_type == "post"));

        let json = serde_json::to_value(&records).unwrap();
        assert!(json[0].get("source").is_none());
    }

    #[tokio::test]
    async fn test_full_mode_keeps_compiled_body() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "one.mdx", &post("2021-01-01", ""));
        write(dir.path(), "two.mdx", &post("2021-02-01", ""));

        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Full)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        for record in &records {
            let doc = record.source.as_ref().unwrap().document().unwrap();
            assert!(doc.html.contains("<p>Body text.</p>"));
        }
    }

    #[tokio::test]
    async fn test_equal_dates_keep_file_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "c.mdx", &post("2019-06-01", ""));
        write(dir.path(), "a.mdx", &post("2020-01-01", ""));
        write(dir.path(), "b.mdx", &post("2020-01-01", ""));

        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap();
        assert_eq!(slugs(&records), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_undated_records_sink() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a-bad.mdx", &post("not-a-date", ""));
        write(dir.path(), "b-none.mdx", "# Just a body\n");
        write(dir.path(), "c-old.mdx", &post("1999-12-31", ""));
        write(dir.path(), "d-new.mdx", &post("2023-03-03", ""));

        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap();
        assert_eq!(slugs(&records), vec!["d-new", "c-old", "a-bad", "b-none"]);
        assert!(records[2].frontmatter.date.is_none());
    }

    #[tokio::test]
    async fn test_malformed_mdx_fails_whole_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.mdx", &post("2021-01-01", ""));
        write(
            dir.path(),
            "broken.mdx",
            "---\ntitle: Broken\n---\n\n<Callout>\nnever closed\n",
        );

        let err = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Compile { .. }));
        assert_eq!(err.slug(), Some("broken"));
        assert!(err.to_string().contains("broken"));
    }

    #[tokio::test]
    async fn test_only_mdx_files_are_listed() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "post.mdx", &post("2021-01-01", ""));
        write(dir.path(), "notes.md", "# not mdx");
        write(dir.path(), "cover.png", "binary");
        fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "deep.mdx", &post("2022-01-01", ""));

        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap();
        assert_eq!(slugs(&records), vec!["post"]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = loader()
            .load_all(dir.path().join("nope"), "post", LoadMode::Slim)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Directory { .. }));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_non_utf8_file_name_fails_listing() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        write(dir.path(), "fine.mdx", &post("2021-01-01", ""));
        let name = OsStr::from_bytes(b"bad-\xff.mdx");
        fs::write(dir.path().join(name), post("2021-02-01", "")).unwrap();

        let err = loader()
            .load_all(dir.path(), "post", LoadMode::Slim)
            .await
            .unwrap_err();
        assert!(matches!(err, ContentError::Directory { .. }));
    }

    #[tokio::test]
    async fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let records = loader()
            .load_all(dir.path(), "post", LoadMode::Full)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_load_single_record() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "hello.mdx",
            "---\ntitle: Hello\ntype: ignored\ndate: 2022-01-10\ntags: [Rust, {name: Web Dev}]\n---\n\n# Hello\n",
        );

        let record = loader().load("hello", dir.path(), "doc").await.unwrap();
        assert_eq!(record.slug, "hello");
        assert_eq!(record.content, "# Hello\n");
        assert_eq!(record.frontmatter.content_type, "doc");
        assert_eq!(record.frontmatter.title.as_deref(), Some("Hello"));
        let tag_slugs: Vec<_> = record.frontmatter.tags.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(tag_slugs, vec!["rust", "web-dev"]);
        assert!(record.source.is_some());
    }

    #[tokio::test]
    async fn test_slug_with_extension() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "post-a.mdx", &post("2021-05-01", ""));

        let record = loader().load("post-a.mdx", dir.path(), "post").await.unwrap();
        assert_eq!(record.slug, "post-a");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = loader().load("ghost", dir.path(), "post").await.unwrap_err();
        assert!(matches!(err, ContentError::NotFound { .. }));
        assert_eq!(err.slug(), Some("ghost"));
    }

    #[tokio::test]
    async fn test_custom_compiler() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "raw.mdx", "---\ntitle: Raw\n---\n<Anything {goes\n");

        let loader = ContentLoader::new(EchoCompiler, TagNormalizer::new());
        let record = loader.load("raw", dir.path(), "post").await.unwrap();
        assert_eq!(
            record.source.unwrap().compiled_source,
            "<Anything {goes\n"
        );
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("post"), "post");
        assert_eq!(normalize_slug("post.mdx"), "post");
        assert_eq!(normalize_slug("post.mdx.mdx"), "post.mdx");
    }
}
