//! Build stages, their outcomes, and the errors that abort a build.

use std::fmt;
use std::path::PathBuf;

use kiln_compilers::{BundleError, CompileError};

/// One step of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Clean,
    Provision,
    Styles,
    Scripts,
    Html,
    Images,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Clean => "clean",
            Stage::Provision => "provision",
            Stage::Styles => "styles",
            Stage::Scripts => "scripts",
            Stage::Html => "html",
            Stage::Images => "images",
        };
        f.write_str(name)
    }
}

/// Result of a stage whose input is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// Output was written
    Built { output: PathBuf, bytes: usize },

    /// Input was missing, nothing was written
    Skipped { reason: String },
}

impl StageOutcome {
    pub fn is_built(&self) -> bool {
        matches!(self, StageOutcome::Built { .. })
    }
}

/// Errors that abort the build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to create {path}: {source}")]
    Provision {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error compiling SCSS: {0}")]
    Styles(#[from] CompileError),

    #[error("Failed to write {path}: {source}")]
    StylesWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error building JS: {0}")]
    Scripts(#[from] BundleError),

    #[error("Error copying HTML files: {path}: {source}")]
    Html {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error copying images: {path}: {source}")]
    Images {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unexpected build error: {0}")]
    Internal(String),
}

impl BuildError {
    /// Stage the error belongs to. `Internal` errors are attributed to no
    /// stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            BuildError::Provision { .. } => Some(Stage::Provision),
            BuildError::Styles(_) | BuildError::StylesWrite { .. } => Some(Stage::Styles),
            BuildError::Scripts(_) => Some(Stage::Scripts),
            BuildError::Html { .. } => Some(Stage::Html),
            BuildError::Images { .. } => Some(Stage::Images),
            BuildError::Internal(_) => None,
        }
    }

    /// Process exit code for this error.
    ///
    /// Provisioning has no code of its own and shares the code of
    /// unexpected errors.
    pub fn exit_code(&self) -> u8 {
        match self.stage() {
            Some(Stage::Styles) => 2,
            Some(Stage::Scripts) => 3,
            Some(Stage::Html) => 4,
            Some(Stage::Images) => 5,
            _ => 10,
        }
    }
}
