//! ASCII directory-tree renderer for the repository layout page.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Bounds and filters for a tree render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeOptions {
    /// Directories deeper than this contribute no lines.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Entry names excluded wherever they appear in the walk.
    #[serde(default = "default_exclude")]
    pub exclude: BTreeSet<String>,
}

fn default_max_depth() -> usize {
    3
}

fn default_exclude() -> BTreeSet<String> {
    ["node_modules", "__pycache__", "venv", "target"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            exclude: default_exclude(),
        }
    }
}

/// Render the directory tree rooted at `root` as one line per entry, with
/// `├── `/`└── ` connectors and `│   `/four-space indent continuations.
///
/// Hidden entries (leading `.`) and names in `options.exclude` are skipped.
/// Entries are sorted lexicographically per directory; the walk is
/// depth-first. A directory whose listing fails (permissions, deletion
/// mid-walk, nonexistent root) contributes zero lines and does not abort the
/// rest of the render.
pub fn render(root: &Path, options: &TreeOptions) -> Vec<String> {
    let mut lines = Vec::new();
    walk(root, "", 0, options, &mut lines);
    lines
}

fn walk(dir: &Path, prefix: &str, depth: usize, options: &TreeOptions, out: &mut Vec<String>) {
    if depth >= options.max_depth {
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                error = ?e,
                path = %dir.display(),
                "Failed to list directory, skipping subtree"
            );
            return;
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.') && !options.exclude.contains(name))
        .collect();
    names.sort();

    let count = names.len();
    for (i, name) in names.into_iter().enumerate() {
        let is_last = i == count - 1;
        let connector = if is_last { "└── " } else { "├── " };
        let path = dir.join(&name);

        if path.is_dir() {
            out.push(format!("{prefix}{connector}{name}/"));
            let extension = if is_last { "    " } else { "│   " };
            walk(
                &path,
                &format!("{prefix}{extension}"),
                depth + 1,
                options,
                out,
            );
        } else {
            out.push(format!("{prefix}{connector}{name}"));
        }
    }
}
