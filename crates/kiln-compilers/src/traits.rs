//! Trait definitions for style compilers and script bundlers.

use std::path::{Path, PathBuf};

/// How compiled CSS is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Whitespace-free output
    #[default]
    Compressed,

    /// Human-readable output
    Expanded,
}

/// Runtime the bundle is built for. Decides which `package.json` fields are
/// consulted when resolving bare specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "browser" => Ok(Self::Browser),
            "node" => Ok(Self::Node),
            other => Err(format!("unknown platform '{other}' (expected browser or node)")),
        }
    }
}

/// Settings for a single bundling run.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    /// Inline every transitively imported module into one file
    pub bundle: bool,

    /// Compress and mangle the output
    pub minify: bool,

    /// Emit a source map next to the output (not supported)
    pub sourcemap: bool,

    /// Target runtime
    pub platform: Platform,

    /// ECMAScript level the output is lowered to (e.g. "es2017")
    pub target: String,

    /// File the bundle is written to
    pub outfile: PathBuf,
}

impl BundleOptions {
    /// Options for a minified browser bundle written to `outfile`.
    pub fn browser(outfile: impl Into<PathBuf>) -> Self {
        Self {
            bundle: true,
            minify: true,
            sourcemap: false,
            platform: Platform::Browser,
            target: "es2017".to_string(),
            outfile: outfile.into(),
        }
    }
}

/// Summary of a finished bundle.
#[derive(Debug, Clone)]
pub struct BundleOutput {
    /// Where the bundle was written
    pub outfile: PathBuf,

    /// Number of modules included
    pub modules: usize,

    /// Size of the written file
    pub bytes: usize,
}

/// Errors raised by a style compiler.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{path}: {message}")]
    Syntax { path: String, message: String },

    #[error("CSS minify error: {0}")]
    Minify(String),
}

/// Errors raised by a script bundler.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("Could not resolve '{specifier}' imported from {importer}")]
    Resolve { specifier: String, importer: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: {message}")]
    Syntax { path: String, message: String },

    #[error("Unsupported option: {0}")]
    Unsupported(String),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Compiles a stylesheet entry file into CSS text.
pub trait StyleCompiler: Send + Sync {
    /// Compiler identifier used in log lines
    fn name(&self) -> &'static str;

    /// Compile `entry` and return the CSS.
    fn compile(&self, entry: &Path, style: OutputStyle) -> Result<String, CompileError>;
}

/// Bundles a script entry file and writes the result to `options.outfile`.
pub trait ScriptBundler: Send + Sync {
    /// Bundler identifier used in log lines
    fn name(&self) -> &'static str;

    /// Bundle `entry` according to `options`.
    fn bundle(&self, entry: &Path, options: &BundleOptions) -> Result<BundleOutput, BundleError>;
}
