//! SCSS compilation with grass, minified with lightningcss when it can parse
//! the result.

use std::path::{Path, PathBuf};

use crate::traits::{CompileError, OutputStyle, StyleCompiler};

/// SCSS compiler backed by grass.
#[derive(Debug, Default, Clone)]
pub struct SassCompiler {
    /// Extra directories searched for `@use` / `@import`
    load_paths: Vec<PathBuf>,
}

impl SassCompiler {
    /// Create a compiler that only resolves imports relative to the entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add directories searched when resolving imports.
    pub fn with_load_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.load_paths.extend(paths);
        self
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, CompileError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| CompileError::Minify(format!("CSS parse error: {}", e)))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| CompileError::Minify(e.to_string()))?;

        Ok(minified.code)
    }
}

impl StyleCompiler for SassCompiler {
    fn name(&self) -> &'static str {
        "grass"
    }

    fn compile(&self, entry: &Path, style: OutputStyle) -> Result<String, CompileError> {
        let grass_style = match style {
            OutputStyle::Compressed => grass::OutputStyle::Compressed,
            OutputStyle::Expanded => grass::OutputStyle::Expanded,
        };

        let mut options = grass::Options::default().style(grass_style);
        if let Some(dir) = entry.parent() {
            options = options.load_path(dir);
        }
        for path in &self.load_paths {
            options = options.load_path(path);
        }

        let css = grass::from_path(entry, &options).map_err(|e| CompileError::Syntax {
            path: entry.display().to_string(),
            message: e.to_string(),
        })?;

        if style != OutputStyle::Compressed || css.trim().is_empty() {
            return Ok(css);
        }

        // grass already compressed the output; lightningcss only shortens it
        // further and rejects some hacks that Sass passes through.
        match Self::minify_css(&css) {
            Ok(minified) => Ok(minified),
            Err(e) => {
                tracing::debug!("Keeping grass output for {}: {}", entry.display(), e);
                Ok(css)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn compiles_nested_rules_compressed() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(
            &entry,
            r#"
$accent: #ff0000;

.card {
    padding: 10px;

    .title {
        color: $accent;
    }
}
"#,
        )
        .unwrap();

        let css = SassCompiler::new()
            .compile(&entry, OutputStyle::Compressed)
            .unwrap();

        assert!(!css.contains('\n'));
        assert!(css.contains(".card .title"));
        assert!(!css.contains("$accent"));
    }

    #[test]
    fn resolves_partials_next_to_entry() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("_colors.scss"), "$brand: blue;").unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "@use 'colors';\nbody { color: colors.$brand; }").unwrap();

        let css = SassCompiler::new()
            .compile(&entry, OutputStyle::Compressed)
            .unwrap();

        assert_eq!(css, "body{color:#00f}");
    }

    #[test]
    fn keeps_property_hacks_lightningcss_rejects() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "a { *zoom: 1; }").unwrap();

        let css = SassCompiler::new()
            .compile(&entry, OutputStyle::Compressed)
            .unwrap();

        assert!(css.contains("*zoom"));
    }

    #[test]
    fn resolves_configured_load_paths() {
        let temp = tempdir().unwrap();
        let vendor = temp.path().join("vendor");
        fs::create_dir_all(&vendor).unwrap();
        fs::write(vendor.join("_reset.scss"), "html { margin: 0; }").unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "@import 'reset';").unwrap();

        let css = SassCompiler::new()
            .with_load_paths([vendor])
            .compile(&entry, OutputStyle::Compressed)
            .unwrap();

        assert!(css.contains("html"));
    }

    #[test]
    fn expanded_output_keeps_newlines() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "a { color: red; }\nb { color: blue; }").unwrap();

        let css = SassCompiler::new()
            .compile(&entry, OutputStyle::Expanded)
            .unwrap();

        assert!(css.contains('\n'));
    }

    #[test]
    fn undefined_variable_is_a_syntax_error() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "body { color: $missing; }").unwrap();

        let err = SassCompiler::new()
            .compile(&entry, OutputStyle::Compressed)
            .unwrap_err();

        assert!(matches!(err, CompileError::Syntax { .. }));
    }

    #[test]
    fn empty_stylesheet_compiles_to_empty_output() {
        let temp = tempdir().unwrap();
        let entry = temp.path().join("main.scss");
        fs::write(&entry, "// nothing yet\n").unwrap();

        let css = SassCompiler::new()
            .compile(&entry, OutputStyle::Compressed)
            .unwrap();

        assert!(css.trim().is_empty());
    }
}
