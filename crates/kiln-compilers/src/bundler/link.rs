//! Links a module graph into a single script.
//!
//! Each module becomes a function in a registry array. Exports are installed
//! as getters before the module body runs, so a module caught in a cycle can
//! be required before it has finished evaluating. Imported names were
//! already rewritten to reads of the required module's exports object. The
//! whole bundle is an IIFE that requires module 0.

use std::fmt::Write as _;
use std::path::Path;

use crate::bundler::graph::{Module, ModuleGraph};
use crate::bundler::scan::{member, quote, request_var, ExportBinding};

const RUNTIME: &str = r#"var __kiln_cache = [];
function __kiln_require(id) {
  var cached = __kiln_cache[id];
  if (cached) return cached;
  var exports = __kiln_cache[id] = {};
  __kiln_modules[id](exports);
  return exports;
}
function __kiln_export(target, getters) {
  for (var name in getters) {
    Object.defineProperty(target, name, { enumerable: true, get: getters[name] });
  }
}
function __kiln_reexport(target, source) {
  Object.keys(source).forEach(function (name) {
    if (name === "default" || Object.prototype.hasOwnProperty.call(target, name)) return;
    Object.defineProperty(target, name, { enumerable: true, get: function () { return source[name]; } });
  });
}
"#;

/// Produce the unminified bundle for `graph`. `root` is used to print
/// module paths relative to the entry's directory.
pub fn link(graph: &ModuleGraph, root: &Path) -> String {
    let mut out = String::new();

    out.push_str("(function () {\n\"use strict\";\nvar __kiln_modules = [\n");
    for (id, module) in graph.modules.iter().enumerate() {
        let label = module.path.strip_prefix(root).unwrap_or(&module.path);
        let _ = writeln!(out, "// {}", label.display().to_string().replace('\\', "/"));
        out.push_str("function (__kiln_exports) {\n");
        out.push_str(&module_prologue(module));
        out.push_str(&module.body);
        out.push_str("\n}");
        if id + 1 < graph.modules.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str("];\n");
    out.push_str(RUNTIME);
    out.push_str("__kiln_require(0);\n})();\n");

    out
}

/// Export getters, dependency requires and star re-exports for one module.
fn module_prologue(module: &Module) -> String {
    let mut out = String::new();

    let getters: Vec<String> = module
        .scan
        .exports
        .iter()
        .filter_map(|export| {
            let (exported, value) = match export {
                ExportBinding::Local { exported, local } => (exported, local.clone()),
                ExportBinding::ReExport {
                    exported,
                    imported,
                    request,
                } => (exported, member(&request_var(*request), imported)),
                ExportBinding::Namespace { exported, request } => {
                    (exported, request_var(*request))
                }
                ExportBinding::Star { .. } => return None,
            };
            Some(format!(
                "{}: function () {{ return {}; }}",
                quote(exported),
                value
            ))
        })
        .collect();

    if !getters.is_empty() {
        let _ = writeln!(
            out,
            "__kiln_export(__kiln_exports, {{ {} }});",
            getters.join(", ")
        );
    }

    for (request, id) in module.dependencies.iter().enumerate() {
        let _ = writeln!(out, "var {} = __kiln_require({});", request_var(request), id);
    }

    for export in &module.scan.exports {
        if let ExportBinding::Star { request } = export {
            let _ = writeln!(
                out,
                "__kiln_reexport(__kiln_exports, {});",
                request_var(*request)
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::resolve::Resolver;
    use std::fs;
    use tempfile::tempdir;

    fn link_dir(files: &[(&str, &str)]) -> String {
        let temp = tempdir().unwrap();
        for (name, content) in files {
            fs::write(temp.path().join(name), content).unwrap();
        }
        let root = fs::canonicalize(temp.path()).unwrap();
        let entry = root.join(files[0].0);
        let graph = ModuleGraph::build(&entry, &Resolver::default(), "es2017").unwrap();
        link(&graph, &root)
    }

    #[test]
    fn wraps_each_module_with_a_label() {
        let bundle = link_dir(&[
            ("main.js", "import { greet } from './greet.js';\ngreet();\n"),
            ("greet.js", "export function greet() { console.log('hi'); }\n"),
        ]);

        assert!(bundle.contains("// main.js\n"));
        assert!(bundle.contains("// greet.js\n"));
        assert!(bundle.contains("var __kiln_m0 = __kiln_require(1);"));
        assert!(bundle.contains("(0, __kiln_m0[\"greet\"])();"));
        assert!(bundle.contains("\"greet\": function () { return greet; }"));
        assert!(bundle.ends_with("__kiln_require(0);\n})();\n"));
    }

    #[test]
    fn star_exports_are_copied_after_requires() {
        let bundle = link_dir(&[
            ("main.js", "export * from './lib.js';\n"),
            ("lib.js", "export const x = 1;\n"),
        ]);

        let require = bundle.find("var __kiln_m0 = __kiln_require(1);").unwrap();
        let reexport = bundle
            .find("__kiln_reexport(__kiln_exports, __kiln_m0);")
            .unwrap();
        assert!(require < reexport);
    }

    #[test]
    fn namespace_imports_bind_the_exports_object() {
        let bundle = link_dir(&[
            ("main.js", "import * as lib from './lib.js';\nlib.run();\n"),
            ("lib.js", "export function run() {}\n"),
        ]);

        assert!(bundle.contains("__kiln_m0.run();"));
        assert!(!bundle.contains("var lib"));
    }

    #[test]
    fn quotes_non_identifier_export_names() {
        assert_eq!(member("__kiln_m0", "kebab-name"), "__kiln_m0[\"kebab-name\"]");
    }
}
