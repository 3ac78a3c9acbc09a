pub mod core {
    pub mod index;
    pub mod layout;
    pub mod layout_modeler;
    pub mod navigation;
    pub mod parser;
    pub mod stats;
    pub mod view;
    pub mod writer;
}

pub mod utils {
    pub mod document_processor;
}

pub mod config;
pub mod error;

pub use crate::core::index::OutlineIndex;
pub use crate::core::layout::{DocumentOutline, OutlineNode};
pub use crate::core::layout_modeler::{build_outline, BuildOptions, OutlineBuilder};
pub use crate::core::stats::{compute_stats, flatten, FlatOutline, OutlineStats};
pub use crate::core::writer::{from_json, to_json, to_markdown, ExportFormat};
pub use crate::error::{NavigationError, OutlineError};

use serde::{Deserialize, Serialize};

/// Opaque pointer back into the host document. Only the supplier that minted it
/// knows how to interpret the content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(pub String);

impl SourceRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Character formatting of a heading as reported by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatInfo {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub font: Option<String>,
    /// Point size.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub size: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub italic: Option<bool>,
}

impl FormatInfo {
    pub fn is_empty(&self) -> bool {
        self.font.is_none() && self.size.is_none() && self.bold.is_none() && self.italic.is_none()
    }
}

/// One heading occurrence in document reading order, as produced by a heading source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingRecord {
    pub level: i32,
    pub text: String,
    #[serde(default)]
    pub source_ref: SourceRef,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub format_info: Option<FormatInfo>,
}

impl HeadingRecord {
    pub fn new(level: i32, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            source_ref: SourceRef::default(),
            format_info: None,
        }
    }

    pub fn with_source_ref(mut self, source_ref: impl Into<String>) -> Self {
        self.source_ref = SourceRef::new(source_ref);
        self
    }

    pub fn with_format(mut self, format: FormatInfo) -> Self {
        self.format_info = Some(format);
        self
    }
}
