//! MDX compilation with syntax highlighting

use std::ops::Range;

use markdown::mdast::Node;
use markdown::message::{Message, Place};
use markdown::{MdxSignal, ParseOptions};
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
};
use serde::{Deserialize, Serialize};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

use crate::config::{MdxConfig, MdxPlugin};

/// Version of the [`CompiledDocument`] layout
const FORMAT_VERSION: u32 = 1;

/// A syntax error in an MDX body
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct CompileFailure {
    pub line: usize,
    pub message: String,
}

/// Serialized, renderer-ready form of an MDX body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledBody {
    pub compiled_source: String,
}

impl CompiledBody {
    /// Decode the document produced by [`MarkdownCompiler`]
    pub fn document(&self) -> serde_json::Result<CompiledDocument> {
        serde_json::from_str(&self.compiled_source)
    }
}

/// What [`MarkdownCompiler`] serializes into a [`CompiledBody`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledDocument {
    pub version: u32,
    pub html: String,
    /// Components the renderer has to provide
    pub components: Vec<String>,
    /// ESM blocks, verbatim
    pub imports: Vec<String>,
    pub headings: Vec<Heading>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Compiles an MDX body into a [`CompiledBody`]
pub trait MdxCompiler: Send + Sync {
    fn compile(&self, source: &str) -> Result<CompiledBody, CompileFailure>;
}

/// MDX compiler backed by pulldown-cmark and syntect
pub struct MarkdownCompiler {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    config: MdxConfig,
}

impl MarkdownCompiler {
    pub fn new() -> Self {
        Self::with_config(MdxConfig::default())
    }

    pub fn with_config(config: MdxConfig) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            config,
        }
    }

    fn options(&self) -> Options {
        let mut options = Options::empty();
        for plugin in &self.config.plugins {
            options |= match plugin {
                MdxPlugin::Gfm => {
                    Options::ENABLE_TABLES
                        | Options::ENABLE_STRIKETHROUGH
                        | Options::ENABLE_TASKLISTS
                        | Options::ENABLE_GFM
                }
                MdxPlugin::Footnotes => Options::ENABLE_FOOTNOTES,
                MdxPlugin::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
                MdxPlugin::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
                MdxPlugin::Math => Options::ENABLE_MATH,
            };
        }
        options
    }

    /// MDX parse options matching the enabled plugins
    fn parse_options(&self) -> ParseOptions {
        let mut options = ParseOptions::mdx();
        // ESM is only recognized with a parser; statements are kept verbatim
        options.mdx_esm_parse = Some(Box::new(|_: &str| MdxSignal::Ok));

        if self.config.has(MdxPlugin::Gfm) {
            options.constructs.gfm_autolink_literal = true;
            options.constructs.gfm_strikethrough = true;
            options.constructs.gfm_table = true;
            options.constructs.gfm_task_list_item = true;
        }
        if self.config.has(MdxPlugin::Footnotes) {
            options.constructs.gfm_footnote_definition = true;
            options.constructs.gfm_label_start_footnote = true;
        }
        if self.config.has(MdxPlugin::Math) {
            options.constructs.math_flow = true;
            options.constructs.math_text = true;
        }
        options
    }

    /// Parse the body as MDX, failing on syntax errors
    fn parse(&self, source: &str) -> Result<ParsedMdx, CompileFailure> {
        let tree = markdown::to_mdast(source, &self.parse_options()).map_err(compile_failure)?;
        let mut parsed = ParsedMdx::default();
        parsed.collect(&tree);
        Ok(parsed)
    }

    /// Render markdown to HTML, collecting headings on the way
    fn render(&self, markdown: &str) -> (String, Vec<Heading>) {
        let parser = Parser::new_ext(markdown, self.options());

        let mut events: Vec<Event> = Vec::new();
        let mut headings = Vec::new();
        let mut code_block: Option<(Option<String>, String)> = None;
        // (index of the heading's start event, heading text so far)
        let mut heading: Option<(usize, String)> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        let highlighted = self.highlight_code(&code, lang.as_deref());
                        events.push(Event::Html(CowStr::from(highlighted)));
                    }
                }
                Event::Text(text) if code_block.is_some() => {
                    if let Some((_, code)) = code_block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::Start(Tag::Heading { .. }) => {
                    heading = Some((events.len(), String::new()));
                    events.push(event);
                }
                Event::Text(text) if heading.is_some() => {
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    }
                    events.push(Event::Text(text));
                }
                Event::Code(text) if heading.is_some() => {
                    if let Some((_, buf)) = heading.as_mut() {
                        buf.push_str(&text);
                    }
                    events.push(Event::Code(text));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some((start, text)) = heading.take() {
                        let id = assign_heading_id(&mut events[start], &text);
                        headings.push(Heading {
                            level: heading_level(level),
                            id,
                            text: text.trim().to_string(),
                        });
                    }
                    events.push(event);
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        (html_output, headings)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");
        let class = html_escape(lang);
        let plain = || {
            format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class,
                html_escape(code)
            )
        };

        if !self.config.highlight.enable {
            return plain();
        }

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.config.highlight.theme)
            .or_else(|| self.theme_set.themes.values().next());
        let Some(theme) = theme else {
            return plain();
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) if self.config.highlight.line_number => {
                add_line_numbers(&highlighted, &class)
            }
            Ok(highlighted) => format!(
                r#"<figure class="highlight {}">{}</figure>"#,
                class, highlighted
            ),
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                plain()
            }
        }
    }
}

impl Default for MarkdownCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MdxCompiler for MarkdownCompiler {
    fn compile(&self, source: &str) -> Result<CompiledBody, CompileFailure> {
        let parsed = self.parse(source)?;
        let (html, headings) = self.render(&blank_out(source, &parsed.esm_spans));

        let document = CompiledDocument {
            version: FORMAT_VERSION,
            html,
            components: parsed.components,
            imports: parsed.imports,
            headings,
        };
        let compiled_source = serde_json::to_string(&document).map_err(|e| CompileFailure {
            line: 0,
            message: format!("Failed to serialize compiled MDX: {}", e),
        })?;

        Ok(CompiledBody { compiled_source })
    }
}

/// What the renderer needs from the MDX tree
#[derive(Debug, Default)]
struct ParsedMdx {
    components: Vec<String>,
    imports: Vec<String>,
    esm_spans: Vec<Range<usize>>,
}

impl ParsedMdx {
    fn collect(&mut self, node: &Node) {
        match node {
            Node::MdxjsEsm(esm) => {
                self.imports.push(esm.value.clone());
                if let Some(position) = &esm.position {
                    self.esm_spans
                        .push(position.start.offset..position.end.offset);
                }
            }
            Node::MdxJsxFlowElement(element) => self.component(element.name.as_deref()),
            Node::MdxJsxTextElement(element) => self.component(element.name.as_deref()),
            _ => {}
        }

        if let Some(children) = node.children() {
            for child in children {
                self.collect(child);
            }
        }
    }

    /// Record a component once; fragments and lowercase HTML elements are skipped
    fn component(&mut self, name: Option<&str>) {
        let Some(name) = name else {
            return;
        };
        let is_component =
            name.contains('.') || name.chars().next().is_some_and(char::is_uppercase);
        if is_component && !self.components.iter().any(|c| c == name) {
            self.components.push(name.to_string());
        }
    }
}

fn compile_failure(message: Message) -> CompileFailure {
    let line = match message.place.as_deref() {
        Some(Place::Position(position)) => position.start.line,
        Some(Place::Point(point)) => point.line,
        None => 0,
    };
    CompileFailure {
        line,
        message: message.reason,
    }
}

/// Replace the given byte ranges with spaces, keeping line breaks
fn blank_out(source: &str, spans: &[Range<usize>]) -> String {
    if spans.is_empty() {
        return source.to_string();
    }
    source
        .char_indices()
        .map(|(i, c)| {
            if c != '\n' && c != '\r' && spans.iter().any(|span| span.contains(&i)) {
                ' '
            } else {
                c
            }
        })
        .collect()
}

/// Use the explicit `{#id}` if present, otherwise the slugified text
fn assign_heading_id(start: &mut Event, text: &str) -> String {
    let Event::Start(Tag::Heading { id, .. }) = start else {
        return slug::slugify(text);
    };
    if let Some(explicit) = id {
        return explicit.to_string();
    }
    let generated = slug::slugify(text);
    if !generated.is_empty() {
        *id = Some(CowStr::from(generated.clone()));
    }
    generated
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Add line numbers to highlighted code; `class` is already escaped
fn add_line_numbers(code: &str, class: &str) -> String {
    let lines: Vec<&str> = code.lines().collect();
    let gutter = (1..=lines.len())
        .map(|n| format!(r#"<span class="line-number">{}</span>"#, n))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code">{}</td></tr></table></figure>"#,
        class,
        gutter,
        lines.join("\n")
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
