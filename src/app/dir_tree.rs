//! Directory tree listing for the `dir-tree` command.

use std::fs;
use std::io;
use std::path::Path;

/// Renders a directory subtree with box-drawing connectors.
///
/// Entries are sorted by name; dot-entries (hidden files, including
/// command logs and the workspace snapshot) are skipped.
///
/// # Errors
///
/// Fails if a directory cannot be read.
pub fn tree_lines(root: &Path) -> io::Result<Vec<String>> {
    let name = root
        .file_name()
        .map_or_else(|| root.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut lines = vec![name];
    walk(root, "", &mut lines)?;
    Ok(lines)
}

fn walk(dir: &Path, prefix: &str, lines: &mut Vec<String>) -> io::Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|e| !e.file_name().to_string_lossy().starts_with('.'))
        .collect();
    entries.sort_by_key(std::fs::DirEntry::file_name);

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let last = i + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        let name = entry.file_name().to_string_lossy().into_owned();
        lines.push(format!("{prefix}{connector}{name}"));
        if entry.file_type()?.is_dir() {
            let child_prefix = if last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}│   ")
            };
            walk(&entry.path(), &child_prefix, lines)?;
        }
    }
    Ok(())
}
