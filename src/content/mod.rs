//! Content module - front-matter, tags, dates, MDX compilation and loading

mod date;
mod frontmatter;
pub mod loader;
mod mdx;
mod record;
mod tags;

pub use date::{parse_date, parse_date_string, UtcDate};
pub use frontmatter::RawFrontMatter;
pub use loader::ContentLoader;
pub use mdx::{
    CompileFailure, CompiledBody, CompiledDocument, Heading, MarkdownCompiler, MdxCompiler,
};
pub use record::{ContentRecord, Frontmatter, LoadMode};
pub use tags::{TagMap, TagNormalizer, TagRecord, TagRegistry};
