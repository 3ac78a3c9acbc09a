use crate::core::layout::DocumentOutline;
use crate::core::stats::{flatten, FlatOutline};
use crate::error::Result;
use serde::Deserialize;
use std::fmt;

/// Export encodings for a built outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum ExportFormat {
    #[value(name = "markdown", alias = "md")]
    Markdown,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Json => "json",
        }
    }

    pub fn writer(&self) -> Box<dyn OutlineWriter + Send + Sync> {
        match self {
            ExportFormat::Markdown => Box::new(MarkdownWriter),
            ExportFormat::Json => Box::new(JsonWriter),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Markdown => f.write_str("markdown"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

/// Renders an outline into an export artifact. Implementations are pure: same outline, same bytes.
pub trait OutlineWriter {
    fn extension(&self) -> &'static str;

    fn render(&self, outline: &DocumentOutline) -> Result<String>;

    /// Flat request mode. Defaults to the tree rendering.
    fn render_flat(&self, outline: &DocumentOutline) -> Result<String> {
        self.render(outline)
    }
}

pub struct MarkdownWriter;

impl OutlineWriter for MarkdownWriter {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, outline: &DocumentOutline) -> Result<String> {
        Ok(to_markdown(outline))
    }
}

pub struct JsonWriter;

impl OutlineWriter for JsonWriter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn render(&self, outline: &DocumentOutline) -> Result<String> {
        to_json(outline)
    }

    fn render_flat(&self, outline: &DocumentOutline) -> Result<String> {
        flat_to_json(&FlatOutline::from(outline))
    }
}

/// One `#`-prefixed line per node in pre-order. Empty text leaves a bare marker.
/// Line breaks inside heading text become spaces so a node never spans two lines.
pub fn to_markdown(outline: &DocumentOutline) -> String {
    flatten(outline)
        .into_iter()
        .map(|node| {
            let depth = usize::try_from(node.level).unwrap_or(0);
            format!("{} {}", "#".repeat(depth), single_line(&node.text))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn to_json(outline: &DocumentOutline) -> Result<String> {
    Ok(serde_json::to_string_pretty(outline)?)
}

pub fn flat_to_json(flat: &FlatOutline) -> Result<String> {
    Ok(serde_json::to_string_pretty(flat)?)
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

/// Parse an outline previously produced by `to_json`.
///
/// Each nesting level costs two JSON containers, so serde_json's recursion limit is off and
/// the stack grows on demand instead.
pub fn from_json(json: &str) -> Result<DocumentOutline> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    deserializer.disable_recursion_limit();
    let outline = DocumentOutline::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(outline)
}
