//! Project tree builder
//!
//! Turns a descriptor's include/remove items (or a folder scan) into the
//! file hierarchy shown by the file browser.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::entities::{FileEntry, FileKind, FolderEntry, ProjectDescriptor, ProjectTree};
use crate::domain::value_objects::{ItemPattern, PatternSet, ScanRules};

use super::scan::list_files;

const CODE_BEHIND_SUFFIX: &str = ".cs";

#[derive(Debug, Clone, Default)]
pub struct ProjectTreeBuilder {
    rules: ScanRules,
}

impl ProjectTreeBuilder {
    pub fn new(rules: ScanRules) -> Self {
        Self { rules }
    }

    pub fn build(&self, descriptor: &ProjectDescriptor) -> ProjectTree {
        let folder = descriptor.folder();
        let paths = self.collect_paths(descriptor);
        info!(
            "{}: {} files in project tree",
            descriptor.path.display(),
            paths.len()
        );
        if paths.is_empty() {
            return ProjectTree::empty(folder.to_path_buf());
        }
        ProjectTree {
            project_folder: folder.to_path_buf(),
            root: assemble(pair_code_behind(paths)),
        }
    }

    /// Relative paths of every file the project contains, before pairing.
    pub fn collect_paths(&self, descriptor: &ProjectDescriptor) -> Vec<String> {
        let folder = descriptor.folder();
        let all_files = list_files(folder, &self.rules);
        let mut selected: BTreeSet<String> = BTreeSet::new();

        let scan = descriptor.auto_include || descriptor.includes.is_empty();
        if scan {
            selected.extend(
                all_files
                    .iter()
                    .filter(|f| self.rules.has_scanned_extension(file_name(f)))
                    .cloned(),
            );
            debug!(
                "{}: folder scan found {} files",
                descriptor.path.display(),
                selected.len()
            );
        }

        let explicit = expand_includes(folder, &descriptor.includes, &all_files);
        selected.extend(explicit);

        let removes = compile(folder, &descriptor.excludes);
        selected
            .into_iter()
            .filter(|rel| !self.rules.is_hidden(file_name(rel)))
            .filter(|rel| !removes.matches_file_or_parent(rel))
            .collect()
    }
}

fn expand_includes(folder: &Path, includes: &[ItemPattern], all_files: &[String]) -> Vec<String> {
    let mut out = Vec::new();

    for literal in includes.iter().filter(|p| !p.has_wildcard()) {
        if let Some(on_disk) = all_files
            .iter()
            .find(|f| f.eq_ignore_ascii_case(literal.as_str()))
        {
            out.push(on_disk.clone());
        } else if folder.join(literal.as_str()).is_file() {
            out.push(literal.as_str().to_string());
        } else {
            debug!("listed item '{}' does not exist, skipping", literal.raw());
        }
    }

    let wildcards: Vec<&ItemPattern> = includes.iter().filter(|p| p.has_wildcard()).collect();
    if !wildcards.is_empty() {
        let set = compile(folder, wildcards.iter().copied());
        let before = out.len();
        out.extend(all_files.iter().filter(|f| set.matches_file(f)).cloned());
        debug!(
            "{} wildcard includes expanded to {} files",
            wildcards.len(),
            out.len() - before
        );
    }

    out
}

/// Compile patterns, dropping any the matcher rejects.
fn compile<'a>(folder: &Path, patterns: impl IntoIterator<Item = &'a ItemPattern>) -> PatternSet {
    let valid: Vec<&ItemPattern> = patterns
        .into_iter()
        .filter(|p| match PatternSet::build(folder, std::iter::once(*p)) {
            Ok(_) => true,
            Err(err) => {
                warn!("{}", err);
                false
            }
        })
        .collect();

    match PatternSet::build(folder, valid) {
        Ok(set) => set,
        Err(err) => {
            warn!("{}", err);
            PatternSet::empty()
        }
    }
}

fn file_name(rel: &str) -> &str {
    rel.rsplit('/').next().unwrap_or(rel)
}

/// Attach `X.xaml.cs` under `X.xaml`; paired code-behind files leave the flat list.
fn pair_code_behind(paths: Vec<String>) -> Vec<FileEntry> {
    let by_lower: HashMap<String, &String> =
        paths.iter().map(|p| (p.to_ascii_lowercase(), p)).collect();

    let mut paired: HashMap<String, String> = HashMap::new();
    for path in &paths {
        if FileKind::from_file_name(path) != FileKind::Markup {
            continue;
        }
        let candidate = format!("{path}{CODE_BEHIND_SUFFIX}").to_ascii_lowercase();
        if let Some(code_behind) = by_lower.get(&candidate) {
            paired.insert(path.clone(), (*code_behind).clone());
        }
    }

    let attached: HashSet<&String> = paired.values().collect();
    paths
        .iter()
        .filter(|p| !attached.contains(p))
        .map(|p| {
            let entry = FileEntry::new(p.clone());
            match paired.get(p) {
                Some(cb) => entry.with_code_behind(FileEntry::new(cb.clone())),
                None => entry,
            }
        })
        .collect()
}

fn assemble(files: Vec<FileEntry>) -> FolderEntry {
    let mut root = FolderEntry::default();
    for file in files {
        let segments: Vec<&str> = file.relative_path.split('/').collect();
        let mut folder = &mut root;
        let mut prefix = String::new();
        for segment in &segments[..segments.len().saturating_sub(1)] {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            let idx = match folder.folders.iter().position(|f| f.name == *segment) {
                Some(idx) => idx,
                None => {
                    folder.folders.push(FolderEntry::new(*segment, prefix.clone()));
                    folder.folders.len() - 1
                }
            };
            folder = &mut folder.folders[idx];
        }
        folder.files.push(file);
    }
    sort_folder(&mut root);
    root
}

fn sort_folder(folder: &mut FolderEntry) {
    folder
        .folders
        .sort_by(|a, b| name_order(&a.name, &b.name));
    folder.files.sort_by(|a, b| name_order(&a.name, &b.name));
    for child in &mut folder.folders {
        sort_folder(child);
    }
}

fn name_order(a: &str, b: &str) -> std::cmp::Ordering {
    a.to_ascii_lowercase()
        .cmp(&b.to_ascii_lowercase())
        .then_with(|| a.cmp(b))
}
