//! Static asset build pipeline.
//!
//! Runs the build stages in order (clean, provision, styles, scripts, static
//! copy) and stops at the first stage that fails.

pub mod clean;
pub mod copy;
pub mod pipeline;
pub mod stage;

pub use pipeline::{BuildReport, Pipeline, PipelineConfig};
pub use stage::{BuildError, Stage, StageOutcome};
