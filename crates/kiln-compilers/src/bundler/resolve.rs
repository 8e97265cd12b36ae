//! Import specifier resolution.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bundler::helpers;
use crate::traits::{BundleError, Platform};

/// Extensions tried, in order, when a specifier names a file without one.
const EXTENSIONS: &[&str] = &[".js", ".mjs", ".json"];

/// Files tried when a specifier names a directory.
const INDEX_FILES: &[&str] = &["index.js", "index.mjs"];

/// A resolved module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModulePath {
    /// Canonical path of a file on disk
    File(PathBuf),

    /// Transformer helper bundled from [`helpers`]
    Helper(&'static str),
}

impl ModulePath {
    /// Path used to label the module. Helpers get the path they would have
    /// inside the runtime package.
    pub fn path(&self) -> PathBuf {
        match self {
            Self::File(path) => path.clone(),
            Self::Helper(name) => {
                PathBuf::from(format!("{}/helpers/{}.js", helpers::RUNTIME_PACKAGE, name))
            }
        }
    }
}

/// Resolves import specifiers to files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    platform: Platform,
}

impl Resolver {
    /// Create a resolver for the given platform.
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Resolve `specifier` as written in `importer`.
    ///
    /// File paths are canonical so that one file reached through different
    /// specifiers is only bundled once. Transformer helpers never touch the
    /// filesystem.
    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<ModulePath, BundleError> {
        if let Some(name) = helpers::find(specifier) {
            return Ok(ModulePath::Helper(name));
        }

        let base = importer.parent().unwrap_or(Path::new("."));

        let found = if is_path_like(specifier) {
            resolve_file_or_dir(&base.join(specifier))
        } else {
            self.resolve_package(specifier, base)
        };

        let Some(path) = found else {
            return Err(BundleError::Resolve {
                specifier: specifier.to_string(),
                importer: importer.display().to_string(),
            });
        };

        fs::canonicalize(&path)
            .map(ModulePath::File)
            .map_err(|source| BundleError::Read {
                path: path.display().to_string(),
                source,
            })
    }

    /// Look up a bare specifier in `node_modules`, walking up from `from`.
    fn resolve_package(&self, specifier: &str, from: &Path) -> Option<PathBuf> {
        let (name, subpath) = split_package_specifier(specifier);

        for dir in from.ancestors() {
            let package_dir = dir.join("node_modules").join(name);
            if !package_dir.is_dir() {
                continue;
            }

            return match subpath {
                Some(sub) => resolve_file_or_dir(&package_dir.join(sub)),
                None => self.resolve_package_entry(&package_dir),
            };
        }

        None
    }

    /// Pick the entry file of a package directory from its `package.json`.
    fn resolve_package_entry(&self, package_dir: &Path) -> Option<PathBuf> {
        let manifest = fs::read_to_string(package_dir.join("package.json"))
            .ok()
            .and_then(|content| serde_json::from_str::<serde_json::Value>(&content).ok());

        if let Some(manifest) = manifest {
            let fields: &[&str] = match self.platform {
                Platform::Browser => &["browser", "module", "main"],
                Platform::Node => &["module", "main"],
            };

            for field in fields {
                // `browser` may also be an object of replacements; only the
                // string form names an entry point.
                let Some(entry) = manifest.get(field).and_then(|v| v.as_str()) else {
                    continue;
                };
                if let Some(path) = resolve_file_or_dir(&package_dir.join(entry)) {
                    return Some(path);
                }
            }
        }

        resolve_dir(package_dir)
    }
}

/// Relative and absolute specifiers are resolved against the importer.
fn is_path_like(specifier: &str) -> bool {
    specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || specifier == "."
        || specifier == ".."
}

/// Split `@scope/pkg/sub/path` into (`@scope/pkg`, `Some("sub/path")`).
fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };

    let mut end = 0;
    for (seen, (idx, _)) in specifier.match_indices('/').enumerate() {
        if seen + 1 == name_segments {
            end = idx;
            break;
        }
    }

    if end == 0 {
        (specifier, None)
    } else {
        (&specifier[..end], Some(&specifier[end + 1..]))
    }
}

fn resolve_file_or_dir(path: &Path) -> Option<PathBuf> {
    resolve_file(path).or_else(|| resolve_dir(path))
}

fn resolve_file(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }

    EXTENSIONS.iter().find_map(|ext| {
        let mut candidate = OsString::from(path.as_os_str());
        candidate.push(ext);
        let candidate = PathBuf::from(candidate);
        candidate.is_file().then_some(candidate)
    })
}

fn resolve_dir(path: &Path) -> Option<PathBuf> {
    if !path.is_dir() {
        return None;
    }

    INDEX_FILES
        .iter()
        .map(|name| path.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn touch(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn splits_package_specifiers() {
        assert_eq!(split_package_specifier("lodash"), ("lodash", None));
        assert_eq!(
            split_package_specifier("lodash/fp/map"),
            ("lodash", Some("fp/map"))
        );
        assert_eq!(split_package_specifier("@scope/pkg"), ("@scope/pkg", None));
        assert_eq!(
            split_package_specifier("@scope/pkg/sub"),
            ("@scope/pkg", Some("sub"))
        );
    }

    #[test]
    fn resolves_relative_without_extension() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");
        touch(&temp.path().join("util.js"), "");

        let resolved = Resolver::default().resolve("./util", &main)
            .unwrap()
            .path();

        assert_eq!(
            resolved,
            fs::canonicalize(temp.path().join("util.js")).unwrap()
        );
    }

    #[test]
    fn resolves_directory_index() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");
        touch(&temp.path().join("lib/index.js"), "");

        let resolved = Resolver::default().resolve("./lib", &main)
            .unwrap()
            .path();

        assert!(resolved.ends_with("lib/index.js"));
    }

    #[test]
    fn resolves_parent_relative() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("a/b/mod.js");
        touch(&nested, "");
        touch(&temp.path().join("a/shared.mjs"), "");

        let resolved = Resolver::default().resolve("../shared", &nested)
            .unwrap()
            .path();

        assert!(resolved.ends_with("a/shared.mjs"));
    }

    #[test]
    fn browser_platform_prefers_browser_field() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("src/main.js");
        touch(&main, "");
        let pkg = temp.path().join("node_modules/widget");
        touch(
            &pkg.join("package.json"),
            r#"{ "main": "node.js", "module": "esm.js", "browser": "browser.js" }"#,
        );
        touch(&pkg.join("node.js"), "");
        touch(&pkg.join("esm.js"), "");
        touch(&pkg.join("browser.js"), "");

        let browser = Resolver::new(Platform::Browser)
            .resolve("widget", &main)
            .unwrap()
            .path();
        let node = Resolver::new(Platform::Node).resolve("widget", &main)
            .unwrap()
            .path();

        assert!(browser.ends_with("browser.js"));
        assert!(node.ends_with("esm.js"));
    }

    #[test]
    fn package_without_manifest_uses_index() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");
        touch(&temp.path().join("node_modules/tiny/index.js"), "");

        let resolved = Resolver::default().resolve("tiny", &main)
            .unwrap()
            .path();

        assert!(resolved.ends_with("tiny/index.js"));
    }

    #[test]
    fn resolves_package_subpath() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");
        touch(&temp.path().join("node_modules/@ui/kit/button.js"), "");

        let resolved = Resolver::default()
            .resolve("@ui/kit/button", &main)
            .unwrap()
            .path();

        assert!(resolved.ends_with("kit/button.js"));
    }

    #[test]
    fn runtime_helpers_resolve_without_node_modules() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");

        let resolved = Resolver::default()
            .resolve("@oxc-project/runtime/helpers/objectSpread2", &main)
            .unwrap();

        assert_eq!(resolved, ModulePath::Helper("objectSpread2"));
        assert_eq!(
            resolved.path(),
            PathBuf::from("@oxc-project/runtime/helpers/objectSpread2.js")
        );
    }

    #[test]
    fn missing_module_is_a_resolve_error() {
        let temp = tempdir().unwrap();
        let main = temp.path().join("main.js");
        touch(&main, "");

        let err = Resolver::default()
            .resolve("./does-not-exist", &main)
            .unwrap_err();

        match err {
            BundleError::Resolve { specifier, .. } => assert_eq!(specifier, "./does-not-exist"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
