use crate::core::layout_modeler::{BuildOptions, OutlineBuilder};
use crate::core::layout::DocumentOutline;
use crate::core::parser::{HeadingSource, UniversalSource};
use crate::core::writer::ExportFormat;
use anyhow::{Context, Result};
use log::{debug, error, info};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One rendered export for an input document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub format: ExportFormat,
    pub file_name: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct ProcessSummary {
    pub processed: usize,
    pub failed: usize,
    pub written: Vec<PathBuf>,
}

pub struct OutlineProcessor {
    source: UniversalSource,
    options: BuildOptions,
    formats: Vec<ExportFormat>,
    flat: bool,
}

impl OutlineProcessor {
    pub fn new(options: BuildOptions, formats: Vec<ExportFormat>, flat: bool) -> Self {
        Self {
            source: UniversalSource::new(),
            options,
            formats,
            flat,
        }
    }

    /// Read the headings of one input and build its outline.
    pub fn outline_for<P: AsRef<Path>>(&self, path: P) -> Result<DocumentOutline> {
        let records = self.source.headings(path.as_ref())?;
        Ok(OutlineBuilder::build(&records, &self.options))
    }

    /// Render every configured export for one input.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Export>> {
        let path = path.as_ref();
        let outline = self.outline_for(path)?;
        let stem = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mut exports = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            let writer = format.writer();
            let (content, kind) = if self.flat {
                (writer.render_flat(&outline)?, "flat")
            } else {
                (writer.render(&outline)?, "outline")
            };
            exports.push(Export {
                format: *format,
                file_name: format!("{}.{}.{}", stem, kind, writer.extension()),
                content,
            });
        }

        debug!(
            "{}: {} headings, max level {}",
            path.display(),
            outline.total_headings,
            outline.max_depth
        );
        Ok(exports)
    }

    /// Build and export outlines for every supported file under `input_dir`.
    ///
    /// Inputs are independent, so they are processed in parallel. A failing input is
    /// logged and counted; the rest still run.
    pub fn process_documents<P1: AsRef<Path>, P2: AsRef<Path>>(
        &self,
        input_dir: P1,
        output_dir: P2,
    ) -> Result<ProcessSummary> {
        let input_path = input_dir.as_ref();
        let output_path = output_dir.as_ref();

        info!("Starting to process documents from: {}", input_path.display());
        fs::create_dir_all(output_path)
            .with_context(|| format!("Failed to create output directory {}", output_path.display()))?;

        let mut summary = ProcessSummary::default();
        let mut inputs: Vec<(PathBuf, PathBuf)> = Vec::new();
        let mut claimed: HashSet<PathBuf> = HashSet::new();

        for entry in WalkDir::new(input_path).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    error!("Failed to read directory entry: {}", e);
                    summary.failed += 1;
                    continue;
                }
            };
            if !(entry.file_type().is_file() && UniversalSource::supports(entry.path())) {
                debug!("Skipping entry: {}", entry.path().display());
                continue;
            }

            // Mirror the input's subdirectory so equal stems in different folders stay apart.
            let relative_dir = entry
                .path()
                .strip_prefix(input_path)
                .ok()
                .and_then(Path::parent)
                .unwrap_or_else(|| Path::new(""));
            let target_dir = output_path.join(relative_dir);
            let stem = entry.path().file_stem().unwrap_or_default();
            if !claimed.insert(target_dir.join(stem)) {
                error!(
                    "Failed to process {}: another input in the same folder exports under the name {:?}",
                    entry.path().display(),
                    stem
                );
                summary.failed += 1;
                continue;
            }
            inputs.push((entry.into_path(), target_dir));
        }

        let results: Vec<(PathBuf, Result<Vec<PathBuf>>)> = inputs
            .par_iter()
            .map(|(path, target_dir)| (path.clone(), self.export_file(path, target_dir)))
            .collect();

        for (path, result) in results {
            match result {
                Ok(written) => {
                    info!("Successfully processed: {}", path.display());
                    summary.processed += 1;
                    summary.written.extend(written);
                }
                Err(e) => {
                    error!("Failed to process {}: {:#}", path.display(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Completed processing: {} succeeded, {} failed",
            summary.processed, summary.failed
        );
        Ok(summary)
    }

    fn export_file(&self, path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
        let exports = self.process_file(path)?;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let mut written = Vec::new();
        for export in exports {
            let target = output_dir.join(&export.file_name);
            fs::write(&target, &export.content)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            written.push(target);
        }
        Ok(written)
    }
}
