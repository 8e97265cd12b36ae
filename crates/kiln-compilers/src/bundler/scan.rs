//! Per-module analysis of ES module syntax.
//!
//! Parses a module with oxc and records, without touching the AST, what the
//! linker needs: the specifiers it requests, how its import bindings map onto
//! those requests, which names it exports, and the source edits that strip
//! the `import`/`export` syntax from the body.
//!
//! Imports are live: every reference to an imported binding is rewritten to
//! read the exporting module's exports object at the time it runs.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::{
    Declaration, ExportDefaultDeclarationKind, ImportDeclarationSpecifier, Statement,
};
use oxc::ast::AstKind;
use oxc::parser::Parser;
use oxc::semantic::{Semantic, SemanticBuilder, SymbolId};
use oxc::span::{GetSpan, SourceType, Span};

use crate::traits::BundleError;

/// Local name given to a module's `export default <expression>` value.
pub const DEFAULT_LOCAL: &str = "__kiln_default";

/// Variable holding the exports object of a module's `request`th dependency.
pub fn request_var(request: usize) -> String {
    format!("__kiln_m{request}")
}

/// Property access for an export name, which may not be a valid identifier.
pub fn member(object: &str, name: &str) -> String {
    format!("{}[{}]", object, quote(name))
}

pub(crate) fn quote(name: &str) -> String {
    serde_json::to_string(name).unwrap_or_else(|_| format!("\"{name}\""))
}

/// A replacement of `source[start..end]` with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A binding introduced by an `import` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import { imported as local }` and `import local from`
    Named {
        local: String,
        imported: String,
        request: usize,
    },

    /// `import * as local from`
    Namespace { local: String, request: usize },
}

impl ImportBinding {
    pub fn local(&self) -> &str {
        match self {
            Self::Named { local, .. } | Self::Namespace { local, .. } => local,
        }
    }

    /// Expression that reads the binding's current value.
    fn read(&self) -> String {
        match self {
            Self::Named {
                imported, request, ..
            } => member(&request_var(*request), imported),
            Self::Namespace { request, .. } => request_var(*request),
        }
    }
}

/// A name published on the module's exports object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportBinding {
    /// Exported from this module. `local` is the expression the export
    /// reads, normally the name of a declared binding.
    Local { exported: String, local: String },

    /// `export { imported as exported } from`, or an exported import
    ReExport {
        exported: String,
        imported: String,
        request: usize,
    },

    /// `export * as exported from`, or an exported namespace import
    Namespace { exported: String, request: usize },

    /// `export * from`
    Star { request: usize },
}

/// Result of scanning one module.
#[derive(Debug, Clone, Default)]
pub struct ScannedModule {
    /// Unique specifiers in order of first appearance
    pub requests: Vec<String>,

    pub imports: Vec<ImportBinding>,

    pub exports: Vec<ExportBinding>,

    /// Edits sorted by position, non-overlapping
    pub edits: Vec<Edit>,
}

impl ScannedModule {
    fn request(&mut self, specifier: &str) -> usize {
        if let Some(idx) = self.requests.iter().position(|r| r == specifier) {
            return idx;
        }
        self.requests.push(specifier.to_string());
        self.requests.len() - 1
    }

    fn remove(&mut self, start: u32, end: u32) {
        self.replace(start, end, "");
    }

    fn replace(&mut self, start: u32, end: u32, text: &str) {
        self.edits.push(Edit {
            start: start as usize,
            end: end as usize,
            text: text.to_string(),
        });
    }

    fn export_local(&mut self, exported: &str, local: &str) {
        self.exports.push(ExportBinding::Local {
            exported: exported.to_string(),
            local: local.to_string(),
        });
    }

    /// Exports of imported names are forwarded to the module that owns them.
    fn forward_exported_imports(&mut self) {
        let imports = &self.imports;
        for export in self.exports.iter_mut() {
            let ExportBinding::Local { exported, local } = export else {
                continue;
            };
            let Some(binding) = imports.iter().find(|b| b.local() == local) else {
                continue;
            };
            *export = match binding {
                ImportBinding::Named {
                    imported, request, ..
                } => ExportBinding::ReExport {
                    exported: exported.clone(),
                    imported: imported.clone(),
                    request: *request,
                },
                ImportBinding::Namespace { request, .. } => ExportBinding::Namespace {
                    exported: exported.clone(),
                    request: *request,
                },
            };
        }
    }

    /// Apply the recorded edits to `source`.
    pub fn rewrite(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;

        for edit in &self.edits {
            out.push_str(&source[cursor..edit.start]);
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(&source[cursor..]);

        out
    }
}

/// Scan the ES module at `path` with contents `source`.
pub fn scan_module(path: &Path, source: &str) -> Result<ScannedModule, BundleError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();

    if !ret.errors.is_empty() || ret.panicked {
        let message = ret
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(BundleError::Syntax {
            path: path.display().to_string(),
            message,
        });
    }

    let semantic = SemanticBuilder::new().build(&ret.program).semantic;

    let mut scanned = ScannedModule::default();
    // Whole statements removed from the body
    let mut stripped: Vec<Span> = Vec::new();
    // Import bindings whose references are rewritten
    let mut live: Vec<(SymbolId, usize)> = Vec::new();

    for stmt in &ret.program.body {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                let request = scanned.request(decl.source.value.as_str());

                for specifier in decl.specifiers.iter().flatten() {
                    let (binding, local) = match specifier {
                        ImportDeclarationSpecifier::ImportSpecifier(s) => (
                            ImportBinding::Named {
                                local: s.local.name.to_string(),
                                imported: s.imported.name().to_string(),
                                request,
                            },
                            &s.local,
                        ),
                        ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => (
                            ImportBinding::Named {
                                local: s.local.name.to_string(),
                                imported: "default".to_string(),
                                request,
                            },
                            &s.local,
                        ),
                        ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => (
                            ImportBinding::Namespace {
                                local: s.local.name.to_string(),
                                request,
                            },
                            &s.local,
                        ),
                    };
                    if let Some(symbol) = local.symbol_id.get() {
                        live.push((symbol, scanned.imports.len()));
                    }
                    scanned.imports.push(binding);
                }

                scanned.remove(decl.span.start, decl.span.end);
                stripped.push(decl.span);
            }

            Statement::ExportNamedDeclaration(decl) => {
                if let Some(declaration) = &decl.declaration {
                    // `export const a = 1` keeps the declaration, drops `export`
                    for name in declared_names(declaration) {
                        scanned.export_local(&name, &name);
                    }
                    scanned.remove(decl.span.start, declaration.span().start);
                    continue;
                }

                match &decl.source {
                    Some(source) => {
                        let request = scanned.request(source.value.as_str());
                        for spec in &decl.specifiers {
                            scanned.exports.push(ExportBinding::ReExport {
                                exported: spec.exported.name().to_string(),
                                imported: spec.local.name().to_string(),
                                request,
                            });
                        }
                    }
                    None => {
                        for spec in &decl.specifiers {
                            let exported = spec.exported.name().to_string();
                            let local = spec.local.name().to_string();
                            scanned.export_local(&exported, &local);
                        }
                    }
                }

                scanned.remove(decl.span.start, decl.span.end);
                stripped.push(decl.span);
            }

            Statement::ExportDefaultDeclaration(decl) => {
                let inner = decl.declaration.span();

                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        func.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        class.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };

                match named {
                    Some(name) => {
                        scanned.export_local("default", &name);
                        scanned.remove(decl.span.start, inner.start);
                    }
                    None => {
                        scanned.export_local("default", DEFAULT_LOCAL);
                        scanned.replace(
                            decl.span.start,
                            inner.start,
                            &format!("var {DEFAULT_LOCAL} = "),
                        );
                        // Anonymous function and class declarations carry no
                        // terminator of their own once turned into expressions.
                        if matches!(
                            decl.declaration,
                            ExportDefaultDeclarationKind::FunctionDeclaration(_)
                                | ExportDefaultDeclarationKind::ClassDeclaration(_)
                        ) {
                            scanned.replace(decl.span.end, decl.span.end, ";");
                        }
                    }
                }
            }

            Statement::ExportAllDeclaration(decl) => {
                let request = scanned.request(decl.source.value.as_str());
                let binding = match &decl.exported {
                    Some(exported) => ExportBinding::Namespace {
                        exported: exported.name().to_string(),
                        request,
                    },
                    None => ExportBinding::Star { request },
                };
                scanned.exports.push(binding);
                scanned.remove(decl.span.start, decl.span.end);
                stripped.push(decl.span);
            }

            _ => {}
        }
    }

    for (symbol, import) in live {
        let read = scanned.imports[import].read();
        for edit in reference_edits(&semantic, symbol, &read, source) {
            let removed = stripped
                .iter()
                .any(|s| s.start as usize <= edit.start && edit.end <= s.end as usize);
            if !removed {
                scanned.edits.push(edit);
            }
        }
    }

    scanned.forward_exported_imports();
    scanned.edits.sort_by_key(|e| (e.start, e.end));

    Ok(scanned)
}

/// Edits replacing each reference to `symbol` with `read`.
fn reference_edits(
    semantic: &Semantic<'_>,
    symbol: SymbolId,
    read: &str,
    source: &str,
) -> Vec<Edit> {
    let scoping = semantic.scoping();
    let nodes = semantic.nodes();

    scoping
        .get_resolved_reference_ids(symbol)
        .iter()
        .map(|&reference| {
            let node = scoping.get_reference(reference).node_id();
            let span = nodes.kind(node).span();
            let name = &source[span.start as usize..span.end as usize];

            let text = match nodes.parent_kind(node) {
                // `{ a }` and `({ a } = value)` need an explicit key
                AstKind::ObjectProperty(prop) if prop.shorthand => format!("{name}: {read}"),
                AstKind::AssignmentTargetPropertyIdentifier(_) => format!("{name}: {read}"),
                // Imported functions are called without a `this`
                AstKind::CallExpression(call) if call.callee.span() == span => {
                    format!("(0, {read})")
                }
                AstKind::TaggedTemplateExpression(tagged) if tagged.tag.span() == span => {
                    format!("(0, {read})")
                }
                _ => read.to_string(),
            };

            Edit {
                start: span.start as usize,
                end: span.end as usize,
                text,
            }
        })
        .collect()
}

/// Names bound by an exported declaration.
fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(func) => func
            .id
            .iter()
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::ClassDeclaration(class) => class
            .id
            .iter()
            .map(|id| id.name.to_string())
            .collect(),
        _ => Vec::new(),
    }
}
