//! Output cleanup command.

use std::path::Path;

use anyhow::Result;
use kiln_pipeline::Pipeline;

use crate::config::load_config;

/// Run the clean command.
pub async fn run(root: &Path, config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?.into_pipeline_config(root)?;
    let pipeline = Pipeline::new(config);

    pipeline.clean().await?;
    tracing::info!("Removed {}", pipeline.config().output().display());

    Ok(())
}
