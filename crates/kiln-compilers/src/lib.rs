//! Compiler adapters for the kiln asset pipeline.
//!
//! This crate defines the narrow contracts the pipeline uses to turn a
//! stylesheet entry into CSS and a script entry into a single browser bundle,
//! together with the concrete implementations kiln ships with.

pub mod bundler;
pub mod sass;
pub mod traits;

pub use bundler::EsBundler;
pub use sass::SassCompiler;
pub use traits::{
    BundleError, BundleOptions, BundleOutput, CompileError, OutputStyle, Platform, ScriptBundler,
    StyleCompiler,
};
