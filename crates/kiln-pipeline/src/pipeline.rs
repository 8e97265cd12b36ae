//! Build orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use kiln_compilers::{
    BundleOptions, EsBundler, OutputStyle, Platform, SassCompiler, ScriptBundler, StyleCompiler,
};

use crate::clean::{clean, guard_output_dir};
use crate::copy::{copy_html, copy_tree};
use crate::stage::{BuildError, Stage, StageOutcome};

/// Configuration for a build.
///
/// Entry paths are relative to `source_dir`, output paths relative to
/// `output_dir`, and both directories relative to `root`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Project root
    pub root: PathBuf,

    /// Source tree
    pub source_dir: PathBuf,

    /// Output tree, removed and rebuilt on every run
    pub output_dir: PathBuf,

    /// Stylesheet entry
    pub style_entry: PathBuf,

    /// Compiled stylesheet
    pub style_output: PathBuf,

    pub style: OutputStyle,

    /// Extra stylesheet import directories, relative to `root`
    pub style_load_paths: Vec<PathBuf>,

    /// Script entry
    pub script_entry: PathBuf,

    /// Bundled script
    pub script_output: PathBuf,

    /// Inline imported modules
    pub bundle: bool,

    pub minify: bool,

    /// ECMAScript level of the bundle
    pub target: String,

    pub platform: Platform,

    /// Images directory name, same under source and output
    pub images_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("build"),
            style_entry: PathBuf::from("scss/main.scss"),
            style_output: PathBuf::from("css/main.css"),
            style: OutputStyle::Compressed,
            style_load_paths: Vec::new(),
            script_entry: PathBuf::from("js/main.js"),
            script_output: PathBuf::from("js/main.js"),
            bundle: true,
            minify: true,
            target: "es2017".to_string(),
            platform: Platform::Browser,
            images_dir: PathBuf::from("img"),
        }
    }
}

impl PipelineConfig {
    /// Absolute-or-root-relative source directory.
    pub fn source(&self) -> PathBuf {
        self.root.join(&self.source_dir)
    }

    /// Absolute-or-root-relative output directory.
    pub fn output(&self) -> PathBuf {
        self.root.join(&self.output_dir)
    }
}

/// Result of a successful build.
#[derive(Debug)]
pub struct BuildReport {
    pub styles: StageOutcome,

    pub scripts: StageOutcome,

    /// Number of HTML files copied
    pub html_files: usize,

    /// Number of image files copied, `None` if there was no images directory
    pub images: Option<usize>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Sequential asset build.
pub struct Pipeline {
    config: PipelineConfig,
    styles: Arc<dyn StyleCompiler>,
    scripts: Arc<dyn ScriptBundler>,
}

impl Pipeline {
    /// Create a pipeline using the built-in SCSS compiler and bundler.
    pub fn new(config: PipelineConfig) -> Self {
        let load_paths = config
            .style_load_paths
            .iter()
            .map(|p| config.root.join(p))
            .collect::<Vec<_>>();

        Self::with_compilers(
            config,
            Arc::new(SassCompiler::new().with_load_paths(load_paths)),
            Arc::new(EsBundler::new()),
        )
    }

    /// Create a pipeline with custom compiler implementations.
    pub fn with_compilers(
        config: PipelineConfig,
        styles: Arc<dyn StyleCompiler>,
        scripts: Arc<dyn ScriptBundler>,
    ) -> Self {
        Self {
            config,
            styles,
            scripts,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run only the clean stage.
    pub async fn clean(&self) -> Result<(), BuildError> {
        guard_output_dir(&self.config.root, &self.config.output_dir)?;
        tracing::info!("Cleaning build directory...");
        clean(&self.config.output()).await;
        Ok(())
    }

    /// Run every stage, stopping at the first failure.
    pub async fn run(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let output_dir = self.config.output();

        self.clean().await?;
        self.provision().await?;

        let styles = self.compile_styles().await?;
        let scripts = self.bundle_scripts().await?;

        tracing::info!("Copying HTML files...");
        let html_files = copy_html(&self.config.source(), &output_dir).await?;

        let images_src = self.config.source().join(&self.config.images_dir);
        let images = if tokio::fs::try_exists(&images_src).await.unwrap_or(false) {
            tracing::info!("Copying images...");
            let copied =
                copy_tree(&images_src, &output_dir.join(&self.config.images_dir)).await?;
            Some(copied)
        } else {
            None
        };

        Ok(BuildReport {
            styles,
            scripts,
            html_files,
            images,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir,
        })
    }

    /// Create the output directory and the parents of both compiled outputs.
    async fn provision(&self) -> Result<(), BuildError> {
        let output_dir = self.config.output();
        let dirs = [
            output_dir.join(&self.config.style_output),
            output_dir.join(&self.config.script_output),
        ];

        for dir in dirs.iter().filter_map(|p| p.parent()) {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| BuildError::Provision {
                    path: dir.display().to_string(),
                    source,
                })?;
        }

        Ok(())
    }

    async fn compile_styles(&self) -> Result<StageOutcome, BuildError> {
        tracing::info!("Compiling SCSS...");

        let entry = self.config.source().join(&self.config.style_entry);
        if !exists(&entry).await {
            tracing::warn!(
                "SCSS entry not found at {} - skipping CSS build",
                entry.display()
            );
            return Ok(skipped(&entry));
        }

        let compiler = Arc::clone(&self.styles);
        let style = self.config.style;
        let css = run_blocking(Stage::Styles, move || compiler.compile(&entry, style)).await??;

        let output = self.config.output().join(&self.config.style_output);
        tokio::fs::write(&output, &css)
            .await
            .map_err(|source| BuildError::StylesWrite {
                path: output.display().to_string(),
                source,
            })?;

        tracing::debug!("{} wrote {}", self.styles.name(), output.display());

        Ok(StageOutcome::Built {
            output,
            bytes: css.len(),
        })
    }

    async fn bundle_scripts(&self) -> Result<StageOutcome, BuildError> {
        tracing::info!("Bundling JS...");

        let entry = self.config.source().join(&self.config.script_entry);
        if !exists(&entry).await {
            tracing::warn!(
                "JS entry not found at {} - skipping JS build",
                entry.display()
            );
            return Ok(skipped(&entry));
        }

        let options = BundleOptions {
            bundle: self.config.bundle,
            minify: self.config.minify,
            sourcemap: false,
            platform: self.config.platform,
            target: self.config.target.clone(),
            outfile: self.config.output().join(&self.config.script_output),
        };

        let bundler = Arc::clone(&self.scripts);
        let output =
            run_blocking(Stage::Scripts, move || bundler.bundle(&entry, &options)).await??;

        tracing::debug!(
            "{} bundled {} modules into {}",
            self.scripts.name(),
            output.modules,
            output.outfile.display()
        );

        Ok(StageOutcome::Built {
            output: output.outfile,
            bytes: output.bytes,
        })
    }
}

fn skipped(entry: &Path) -> StageOutcome {
    StageOutcome::Skipped {
        reason: format!("{} not found", entry.display()),
    }
}

/// Only a missing entry is skipped. Anything else that exists is handed to
/// the compiler, which reports it.
async fn exists(path: &Path) -> bool {
    matches!(tokio::fs::try_exists(path).await, Ok(true))
}

/// Run a synchronous compiler call off the async runtime. A panic inside the
/// compiler becomes an internal error.
async fn run_blocking<T, F>(stage: Stage, f: F) -> Result<T, BuildError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| BuildError::Internal(format!("{stage} stage did not complete: {e}")))
}
