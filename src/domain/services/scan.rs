//! Project folder walking

use std::path::Path;

use ignore::WalkBuilder;
use tracing::debug;

use crate::domain::value_objects::ScanRules;

/// Every file under `root` outside excluded folders, as sorted forward-slash
/// relative paths.
pub(crate) fn list_files(root: &Path, rules: &ScanRules) -> Vec<String> {
    let excluded: Vec<String> = rules.excluded_folders().to_vec();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            !excluded.iter().any(|f| *f == name)
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!("skipping unreadable entry under {}: {}", root.display(), err);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if let Some(rel) = relative_slash_path(root, entry.path()) {
            files.push(rel);
        }
    }
    files.sort();
    files
}

pub(crate) fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
