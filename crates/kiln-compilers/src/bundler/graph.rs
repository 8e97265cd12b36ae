//! Module graph discovery.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bundler::emit::lower;
use crate::bundler::helpers;
use crate::bundler::resolve::{ModulePath, Resolver};
use crate::bundler::scan::{member, scan_module, ExportBinding, ScannedModule, DEFAULT_LOCAL};
use crate::traits::BundleError;

/// A module reached from the entry.
#[derive(Debug)]
pub struct Module {
    /// Canonical path of the source file, or the runtime path of a helper
    pub path: PathBuf,

    /// Module body with import/export syntax stripped
    pub body: String,

    pub scan: ScannedModule,

    /// Module id for each entry of `scan.requests`
    pub dependencies: Vec<usize>,
}

/// Every module reachable from an entry, indexed by module id.
///
/// The entry has id 0; other ids follow discovery order, which only depends
/// on the source text, so repeated builds number modules identically.
#[derive(Debug)]
pub struct ModuleGraph {
    pub modules: Vec<Module>,
}

impl ModuleGraph {
    /// Discover the graph rooted at `entry`, lowering every module to
    /// `target` as it is loaded.
    pub fn build(entry: &Path, resolver: &Resolver, target: &str) -> Result<Self, BundleError> {
        let entry = fs::canonicalize(entry).map_err(|source| BundleError::Read {
            path: entry.display().to_string(),
            source,
        })?;
        let entry = ModulePath::File(entry);

        let mut ids: HashMap<ModulePath, usize> = HashMap::new();
        let mut queue = vec![entry.clone()];
        ids.insert(entry, 0);

        let mut modules = Vec::new();

        while modules.len() < queue.len() {
            let module = queue[modules.len()].clone();
            let path = module.path();
            let (body, scan) = load(&module, target)?;

            let mut dependencies = Vec::with_capacity(scan.requests.len());
            for specifier in &scan.requests {
                let resolved = resolver.resolve(specifier, &path)?;
                let id = match ids.get(&resolved) {
                    Some(id) => *id,
                    None => {
                        let id = queue.len();
                        ids.insert(resolved.clone(), id);
                        queue.push(resolved);
                        id
                    }
                };
                dependencies.push(id);
            }

            tracing::debug!("Module {}: {}", modules.len(), path.display());

            modules.push(Module {
                path,
                body,
                scan,
                dependencies,
            });
        }

        Ok(Self { modules })
    }

    /// Number of modules in the graph.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Read, lower and scan one module.
fn load(module: &ModulePath, target: &str) -> Result<(String, ScannedModule), BundleError> {
    let path = module.path();
    let source = match module {
        ModulePath::File(file) => fs::read_to_string(file).map_err(|source| BundleError::Read {
            path: file.display().to_string(),
            source,
        })?,
        ModulePath::Helper(name) => helpers::source(name)
            .ok_or_else(|| BundleError::Unsupported(format!("runtime helper '{name}'")))?
            .to_string(),
    };

    if path.extension().and_then(|e| e.to_str()) == Some("json") {
        return load_json(&path, &source);
    }

    let lowered = lower(&path, &source, target)?;
    let scan = scan_module(&path, &lowered)?;
    let body = scan.rewrite(&lowered);
    Ok((body, scan))
}

/// A JSON document becomes the module's default export. The keys of a
/// top-level object are also exported by name.
fn load_json(path: &Path, source: &str) -> Result<(String, ScannedModule), BundleError> {
    let value: serde_json::Value =
        serde_json::from_str(source).map_err(|e| BundleError::Syntax {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    let mut exports = vec![ExportBinding::Local {
        exported: "default".to_string(),
        local: DEFAULT_LOCAL.to_string(),
    }];
    if let serde_json::Value::Object(map) = &value {
        exports.extend(
            map.keys()
                .filter(|key| key.as_str() != "default")
                .map(|key| ExportBinding::Local {
                    exported: key.clone(),
                    local: member(DEFAULT_LOCAL, key),
                }),
        );
    }

    let scan = ScannedModule {
        exports,
        ..Default::default()
    };
    Ok((format!("var {DEFAULT_LOCAL} = {};", source.trim()), scan))
}
