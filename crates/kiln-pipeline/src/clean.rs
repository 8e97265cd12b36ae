//! Output directory cleanup.

use std::path::{Component, Path, PathBuf};

use crate::stage::BuildError;

/// Remove `dir` and everything below it.
///
/// Cleanup is best-effort: a missing directory is the expected case on a
/// fresh checkout, and any other removal error is logged at debug level and
/// swallowed. A directory that survives is overwritten by the later stages.
pub async fn clean(dir: &Path) {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => tracing::debug!("Removed {}", dir.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::debug!("Ignoring failure to remove {}: {}", dir.display(), e),
    }
}

/// Reject output directories whose removal would delete the project.
pub fn guard_output_dir(root: &Path, output: &Path) -> Result<(), BuildError> {
    let root = normalize(root);
    let output = normalize(&root.join(output));

    if root.starts_with(&output) {
        return Err(BuildError::Internal(format!(
            "Refusing to use {} as output directory: it contains the project root",
            output.display()
        )));
    }

    Ok(())
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
