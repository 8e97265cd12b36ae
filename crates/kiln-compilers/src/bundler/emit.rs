//! Lowering, minification and printing with oxc.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::diagnostics::OxcDiagnostic;
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{EngineTargets, TransformOptions, Transformer};

use crate::traits::BundleError;

/// Parse `source` and lower its syntax to `target` (e.g. "es2017").
///
/// Module syntax is kept. Helpers the transformer needs are added as imports
/// of `@oxc-project/runtime`, which the bundler resolves like any other
/// import. `path` labels diagnostics.
pub fn lower(path: &Path, source: &str, target: &str) -> Result<String, BundleError> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, path, source)?;

    let transform_options = TransformOptions::from_target(target)
        .map_err(|e| BundleError::Unsupported(format!("target '{}': {:?}", target, e)))?;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let ret = Transformer::new(&allocator, path, &transform_options)
        .build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(syntax_error(path, &ret.errors));
    }

    Ok(Codegen::new().build(&program).code)
}

/// Compress, mangle and print `source` without comments. Compression never
/// introduces syntax newer than `target`.
pub fn minify(path: &Path, source: &str, target: &str) -> Result<String, BundleError> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, path, source)?;

    let engine_targets = EngineTargets::from_target(target)
        .map_err(|e| BundleError::Unsupported(format!("target '{}': {}", target, e)))?;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions {
            target: engine_targets,
            ..CompressOptions::smallest()
        }),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;

    Ok(code)
}

fn parse<'a>(
    allocator: &'a Allocator,
    path: &Path,
    source: &'a str,
) -> Result<Program<'a>, BundleError> {
    let ret = Parser::new(allocator, source, SourceType::mjs()).parse();
    if !ret.errors.is_empty() || ret.panicked {
        return Err(syntax_error(path, &ret.errors));
    }
    Ok(ret.program)
}

fn syntax_error(path: &Path, errors: &[OxcDiagnostic]) -> BundleError {
    BundleError::Syntax {
        path: path.display().to_string(),
        message: errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    }
}
