//! Copying of static files into the output tree.

use std::path::Path;

use walkdir::WalkDir;

use crate::stage::BuildError;

/// Copy every regular `*.html` file directly inside `source_dir` to
/// `output_dir`, keeping file names. Returns the number of files copied.
pub async fn copy_html(source_dir: &Path, output_dir: &Path) -> Result<usize, BuildError> {
    let html_error = |path: &Path, source: std::io::Error| BuildError::Html {
        path: path.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .map_err(|e| html_error(source_dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| html_error(source_dir, e))?
    {
        names.push(entry.file_name());
    }
    names.sort();

    let mut copied = 0;
    for name in names {
        if !name.to_string_lossy().ends_with(".html") {
            continue;
        }

        let source = source_dir.join(&name);
        // Follows symlinks: a link to an HTML file is copied as a file.
        let metadata = tokio::fs::metadata(&source)
            .await
            .map_err(|e| html_error(&source, e))?;
        if !metadata.is_file() {
            continue;
        }

        tokio::fs::copy(&source, output_dir.join(&name))
            .await
            .map_err(|e| html_error(&source, e))?;
        tracing::debug!("Copied {}", source.display());
        copied += 1;
    }

    Ok(copied)
}

/// Recursively copy `source_dir` to `dest_dir`, preserving relative paths.
/// Returns the number of files copied.
pub async fn copy_tree(source_dir: &Path, dest_dir: &Path) -> Result<usize, BuildError> {
    let image_error = |path: &Path, source: std::io::Error| BuildError::Images {
        path: path.display().to_string(),
        source,
    };

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|e| image_error(dest_dir, e))?;

    let mut copied = 0;
    for entry in WalkDir::new(source_dir)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source_dir).to_path_buf();
            image_error(&path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| BuildError::Internal(e.to_string()))?;
        let target = dest_dir.join(relative);

        if entry.file_type().is_dir() {
            tokio::fs::create_dir_all(&target)
                .await
                .map_err(|e| image_error(&target, e))?;
        } else {
            tokio::fs::copy(entry.path(), &target)
                .await
                .map_err(|e| image_error(entry.path(), e))?;
            copied += 1;
        }
    }

    Ok(copied)
}
