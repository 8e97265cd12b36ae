//! Scaffold a source tree in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files written by `kiln init`, relative to the project root.
const SCAFFOLD: &[(&str, &str)] = &[
    ("kiln.toml", DEFAULT_CONFIG),
    ("src/index.html", DEFAULT_INDEX),
    ("src/scss/main.scss", DEFAULT_SCSS),
    ("src/scss/_variables.scss", DEFAULT_VARIABLES),
    ("src/js/main.js", DEFAULT_MAIN_JS),
    ("src/js/greet.js", DEFAULT_GREET_JS),
];

/// Run the init command.
pub async fn run(root: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing kiln project in {}...", root.display());

    let src_dir = root.join("src");
    if src_dir.exists() && !yes {
        tracing::warn!("src/ directory already exists. Use --yes to overwrite.");
        return Ok(());
    }

    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !yes {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created {}", relative);
    }

    let img_dir = src_dir.join("img");
    if !img_dir.exists() {
        fs::create_dir_all(&img_dir).context("Failed to create images directory")?;
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'kiln build' to produce the build/ directory.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Kiln Configuration

[paths]
# Source tree
source = "src"

# Output tree, removed and rebuilt on every build
output = "build"

# Images directory, copied as-is
images = "img"

[styles]
entry = "scss/main.scss"
output = "css/main.css"
compressed = true

[scripts]
entry = "js/main.js"
output = "js/main.js"
bundle = true
minify = true
target = "es2017"
platform = "browser"
"#;

const DEFAULT_INDEX: &str = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Kiln</title>
    <link rel="stylesheet" href="css/main.css">
  </head>
  <body>
    <main class="page">
      <h1 class="page__title">Hello from kiln</h1>
      <p id="greeting"></p>
    </main>
    <script src="js/main.js"></script>
  </body>
</html>
"#;

const DEFAULT_SCSS: &str = r#"@use 'variables' as vars;

body {
  margin: 0;
  font-family: vars.$font-stack;
  color: vars.$text;
}

.page {
  max-width: vars.$content-width;
  margin: 0 auto;
  padding: 2rem;

  &__title {
    color: vars.$accent;
  }
}
"#;

const DEFAULT_VARIABLES: &str = r#"$font-stack: system-ui, -apple-system, sans-serif;
$text: #1f2328;
$accent: #d9480f;
$content-width: 720px;
"#;

const DEFAULT_MAIN_JS: &str = r#"import { greet } from './greet.js';

document.addEventListener('DOMContentLoaded', () => {
  const target = document.getElementById('greeting');
  if (target) {
    target.textContent = greet('world');
  }
});
"#;

const DEFAULT_GREET_JS: &str = r#"export function greet(name) {
  return `Hello, ${name}!`;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn scaffolds_source_tree() {
        let temp = tempdir().unwrap();

        run(temp.path(), false).await.unwrap();

        for (relative, _) in SCAFFOLD {
            assert!(temp.path().join(relative).is_file(), "{relative} missing");
        }
        assert!(temp.path().join("src/img").is_dir());
    }

    #[tokio::test]
    async fn keeps_existing_sources_without_yes() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/index.html"), "mine").unwrap();

        run(temp.path(), false).await.unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("src/index.html")).unwrap(),
            "mine"
        );
        assert!(!temp.path().join("kiln.toml").exists());
    }

    #[tokio::test]
    async fn overwrites_with_yes() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/index.html"), "mine").unwrap();

        run(temp.path(), true).await.unwrap();

        assert!(fs::read_to_string(temp.path().join("src/index.html"))
            .unwrap()
            .contains("Hello from kiln"));
    }

    #[tokio::test]
    async fn scaffold_builds_cleanly() {
        let temp = tempdir().unwrap();
        run(temp.path(), false).await.unwrap();

        let config = crate::config::load_config(&temp.path().join("kiln.toml"))
            .unwrap()
            .into_pipeline_config(temp.path())
            .unwrap();
        let report = kiln_pipeline::Pipeline::new(config).run().await.unwrap();

        assert!(report.styles.is_built());
        assert!(report.scripts.is_built());
        assert_eq!(report.html_files, 1);
        assert_eq!(report.images, Some(0));
    }
}
