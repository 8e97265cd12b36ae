//! ES module bundler built on oxc.

pub mod emit;
pub mod graph;
pub mod helpers;
pub mod link;
pub mod resolve;
pub mod scan;

use std::fs;
use std::path::Path;

use crate::traits::{BundleError, BundleOptions, BundleOutput, ScriptBundler};

use self::graph::ModuleGraph;
use self::resolve::Resolver;

/// Bundles an ES module entry and its imports into one script.
#[derive(Debug, Default)]
pub struct EsBundler;

impl EsBundler {
    /// Create a new bundler.
    pub fn new() -> Self {
        Self
    }
}

impl ScriptBundler for EsBundler {
    fn name(&self) -> &'static str {
        "oxc"
    }

    fn bundle(&self, entry: &Path, options: &BundleOptions) -> Result<BundleOutput, BundleError> {
        if options.sourcemap {
            return Err(BundleError::Unsupported("source maps".to_string()));
        }

        let (code, modules) = if options.bundle {
            let resolver = Resolver::new(options.platform);
            let graph = ModuleGraph::build(entry, &resolver, &options.target)?;
            let root = graph.modules[0]
                .path
                .parent()
                .unwrap_or(Path::new(""))
                .to_path_buf();
            (link::link(&graph, &root), graph.len())
        } else {
            let source = fs::read_to_string(entry).map_err(|source| BundleError::Read {
                path: entry.display().to_string(),
                source,
            })?;
            (emit::lower(entry, &source, &options.target)?, 1)
        };

        let code = if options.minify {
            emit::minify(entry, &code, &options.target)?
        } else {
            code
        };

        if let Some(parent) = options.outfile.parent() {
            fs::create_dir_all(parent).map_err(|source| BundleError::Write {
                path: parent.display().to_string(),
                source,
            })?;
        }
        fs::write(&options.outfile, &code).map_err(|source| BundleError::Write {
            path: options.outfile.display().to_string(),
            source,
        })?;

        tracing::debug!(
            "Bundled {} modules into {}",
            modules,
            options.outfile.display()
        );

        Ok(BundleOutput {
            outfile: options.outfile.clone(),
            modules,
            bytes: code.len(),
        })
    }
}
