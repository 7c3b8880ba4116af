//! Markup namespace discovery
//!
//! Collects the CLR namespaces a project's markup maps to XML prefixes, via
//! `clr-namespace:` (WPF, MAUI) or `using:` (Avalonia).

use std::collections::BTreeSet;
use std::fs;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::domain::entities::{FileKind, ProjectTree};

static NAMESPACE_MAPPING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"xmlns:\w+\s*=\s*"(?:clr-namespace|using):([^";]+)"#)
        .expect("namespace mapping pattern is valid")
});

const FRAMEWORK_PREFIXES: &[&str] = &["System.", "Microsoft."];

/// Namespaces mapped in `markup`, framework namespaces excluded.
pub fn namespaces_in(markup: &str) -> BTreeSet<String> {
    NAMESPACE_MAPPING
        .captures_iter(markup)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|ns| !ns.is_empty())
        .filter(|ns| !FRAMEWORK_PREFIXES.iter().any(|p| ns.starts_with(p)))
        .map(str::to_string)
        .collect()
}

/// Union over every markup file in the tree; unreadable files are skipped.
pub fn markup_namespaces(tree: &ProjectTree) -> BTreeSet<String> {
    let mut namespaces = BTreeSet::new();
    for file in tree.files().into_iter().filter(|f| f.kind == FileKind::Markup) {
        let path = tree.project_folder.join(&file.relative_path);
        match fs::read_to_string(&path) {
            Ok(content) => namespaces.extend(namespaces_in(&content)),
            Err(err) => debug!("cannot read {}: {}", path.display(), err),
        }
    }
    namespaces
}
