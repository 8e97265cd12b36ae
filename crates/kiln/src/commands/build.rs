//! Asset build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use kiln_compilers::OutputStyle;
use kiln_pipeline::{Pipeline, StageOutcome};

use crate::config::load_config;

/// Run the build command.
pub async fn run(
    root: &Path,
    config_path: &Path,
    output: Option<PathBuf>,
    minify: Option<bool>,
) -> Result<()> {
    let mut config = load_config(config_path)?.into_pipeline_config(root)?;

    if let Some(output) = output {
        config.output_dir = output;
    }
    if let Some(minify) = minify {
        config.minify = minify;
        if !minify {
            config.style = OutputStyle::Expanded;
        }
    }

    let report = Pipeline::new(config).run().await?;

    for (label, outcome) in [("CSS", &report.styles), ("JS", &report.scripts)] {
        if let StageOutcome::Built { output, bytes } = outcome {
            tracing::info!("{}: {} ({} bytes)", label, output.display(), bytes);
        }
    }
    tracing::info!(
        "Copied {} HTML files and {} images in {}ms",
        report.html_files,
        report.images.unwrap_or(0),
        report.duration_ms
    );

    tracing::info!(
        "Build finished successfully. Output in: {}",
        report.output_dir.display()
    );

    Ok(())
}
