//! Configuration file structure (kiln.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use kiln_compilers::{OutputStyle, Platform};
use kiln_pipeline::PipelineConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub styles: StylesConfig,
    #[serde(default)]
    pub scripts: ScriptsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    pub source: String,
    pub output: String,
    pub images: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".to_string(),
            output: "build".to_string(),
            images: "img".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StylesConfig {
    /// Relative to the source directory
    pub entry: String,
    /// Relative to the output directory
    pub output: String,
    pub compressed: bool,
    pub load_paths: Vec<String>,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            entry: "scss/main.scss".to_string(),
            output: "css/main.css".to_string(),
            compressed: true,
            load_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScriptsConfig {
    pub entry: String,
    pub output: String,
    pub bundle: bool,
    pub minify: bool,
    pub target: String,
    pub platform: String,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            entry: "js/main.js".to_string(),
            output: "js/main.js".to_string(),
            bundle: true,
            minify: true,
            target: "es2017".to_string(),
            platform: "browser".to_string(),
        }
    }
}

/// Load configuration from `path` if it exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

impl ConfigFile {
    /// Turn the file settings into a pipeline configuration rooted at `root`.
    pub fn into_pipeline_config(self, root: &Path) -> Result<PipelineConfig> {
        let platform: Platform = self
            .scripts
            .platform
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid [scripts] platform: {}", e))?;

        Ok(PipelineConfig {
            root: root.to_path_buf(),
            source_dir: PathBuf::from(self.paths.source),
            output_dir: PathBuf::from(self.paths.output),
            style_entry: PathBuf::from(self.styles.entry),
            style_output: PathBuf::from(self.styles.output),
            style: if self.styles.compressed {
                OutputStyle::Compressed
            } else {
                OutputStyle::Expanded
            },
            style_load_paths: self.styles.load_paths.into_iter().map(PathBuf::from).collect(),
            script_entry: PathBuf::from(self.scripts.entry),
            script_output: PathBuf::from(self.scripts.output),
            bundle: self.scripts.bundle,
            minify: self.scripts.minify,
            target: self.scripts.target,
            platform,
            images_dir: PathBuf::from(self.paths.images),
        })
    }
}
