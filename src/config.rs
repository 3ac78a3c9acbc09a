use crate::core::layout_modeler::BuildOptions;
use crate::core::writer::ExportFormat;
use clap::Parser;
use std::path::PathBuf;

/// Build document outlines from .docx files or heading-record JSON and export them.
#[derive(Debug, Clone, Parser)]
#[command(name = "outline", version, about)]
pub struct Config {
    /// Input file (.docx or .json) or a directory to process in batch.
    pub input: PathBuf,

    /// Directory for exported files. Single-file exports go to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Drop headings deeper than this level.
    #[arg(long, env = "OUTLINE_MAX_DEPTH")]
    pub max_depth: Option<i32>,

    /// Keep font/size/bold/italic on each node.
    #[arg(long, env = "OUTLINE_INCLUDE_FORMAT")]
    pub include_format: bool,

    /// Export format; repeat for several.
    #[arg(short, long = "format", value_enum, default_values_t = [ExportFormat::Markdown])]
    pub formats: Vec<ExportFormat>,

    /// Export the flat heading list instead of the tree.
    #[arg(long)]
    pub flat: bool,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            include_format: self.include_format,
            max_depth: self.max_depth,
        }
    }

    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Formats in first-seen order without repeats.
    pub fn export_formats(&self) -> Vec<ExportFormat> {
        let mut formats = Vec::new();
        for format in &self.formats {
            if !formats.contains(format) {
                formats.push(*format);
            }
        }
        formats
    }
}
