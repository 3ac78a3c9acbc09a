use anyhow::Context;
use clap::Parser;
use log::info;
use outline_rs::config::Config;
use outline_rs::utils::document_processor::OutlineProcessor;
use std::fs;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level()),
    )
    .try_init();

    let processor = OutlineProcessor::new(
        config.build_options(),
        config.export_formats(),
        config.flat,
    );

    if config.input.is_dir() {
        let output = config
            .output
            .clone()
            .context("--output is required when the input is a directory")?;
        let summary = processor.process_documents(&config.input, &output)?;
        println!(
            "✅ {} documents exported to {} ({} failed)",
            summary.processed,
            output.display(),
            summary.failed
        );
        if summary.failed > 0 {
            anyhow::bail!("{} documents could not be processed", summary.failed);
        }
        return Ok(());
    }

    let exports = processor.process_file(&config.input)?;
    match &config.output {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            for export in exports {
                let target = dir.join(&export.file_name);
                fs::write(&target, &export.content)
                    .with_context(|| format!("Failed to write {}", target.display()))?;
                info!("✅ {} output saved to {}", export.format, target.display());
            }
        }
        None => {
            for export in exports {
                println!("{}", export.content);
            }
        }
    }

    Ok(())
}
