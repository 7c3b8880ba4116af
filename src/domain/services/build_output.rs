//! Build output locator
//!
//! Finds the binary a project's last build produced under its output root.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use ignore::WalkBuilder;
use tracing::{debug, trace};

use crate::domain::entities::ProjectDescriptor;
use crate::domain::value_objects::FrameworkPriority;

pub const DEFAULT_OUTPUT_ROOT: &str = "bin";

/// Output-root subfolders that never hold the runnable build.
const IGNORED_COMPONENTS: &[&str] = &["ref", "refint", "resources"];
const OUTPUT_EXTENSIONS: &[&str] = &["dll", "exe"];

#[derive(Debug, Clone)]
pub struct BuildOutputOptions {
    pub output_root: String,
    pub configurations: FrameworkPriority,
    pub targets: FrameworkPriority,
}

impl Default for BuildOutputOptions {
    fn default() -> Self {
        Self {
            output_root: DEFAULT_OUTPUT_ROOT.to_string(),
            configurations: FrameworkPriority::configuration_defaults(),
            targets: FrameworkPriority::build_target_defaults(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub path: PathBuf,
    pub modified: SystemTime,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOutputLocator {
    options: BuildOutputOptions,
}

impl BuildOutputLocator {
    pub fn new(options: BuildOutputOptions) -> Self {
        Self { options }
    }

    pub fn output_root(&self, descriptor: &ProjectDescriptor) -> PathBuf {
        descriptor.folder().join(&self.options.output_root)
    }

    /// Most recently modified `<name>.dll`/`<name>.exe`. Equal timestamps fall
    /// back to configuration rank, then target rank, then path order.
    pub fn locate(&self, descriptor: &ProjectDescriptor) -> Option<BuildOutput> {
        let root = self.output_root(descriptor);
        if !root.is_dir() {
            debug!("{} has no output root {}", descriptor.name(), root.display());
            return None;
        }

        let candidates = self.candidates(&root, &descriptor.name());
        trace!(
            "{} build output candidates for {}",
            candidates.len(),
            descriptor.name()
        );
        candidates
            .into_iter()
            .min_by(|a, b| self.preference(&root, a, b))
    }

    /// Every `.dll`/`.exe` under the output root, newest first.
    pub fn all_outputs(&self, descriptor: &ProjectDescriptor) -> Vec<PathBuf> {
        let root = self.output_root(descriptor);
        if !root.is_dir() {
            return Vec::new();
        }
        let mut outputs = walk_outputs(&root, |file| {
            Path::new(file)
                .extension()
                .is_some_and(|ext| OUTPUT_EXTENSIONS.iter().any(|e| ext == *e))
        });
        outputs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        outputs.into_iter().map(|o| o.path).collect()
    }

    fn candidates(&self, root: &Path, name: &str) -> Vec<BuildOutput> {
        let wanted: Vec<String> = OUTPUT_EXTENSIONS
            .iter()
            .map(|ext| format!("{name}.{ext}").to_ascii_lowercase())
            .collect();
        walk_outputs(root, |file| wanted.iter().any(|w| w == file))
    }

    /// `Less` means `a` is preferred.
    fn preference(&self, root: &Path, a: &BuildOutput, b: &BuildOutput) -> Ordering {
        b.modified
            .cmp(&a.modified)
            .then_with(|| {
                rank_in(&self.options.configurations, root, &a.path)
                    .cmp(&rank_in(&self.options.configurations, root, &b.path))
            })
            .then_with(|| {
                rank_in(&self.options.targets, root, &a.path)
                    .cmp(&rank_in(&self.options.targets, root, &b.path))
            })
            .then_with(|| a.path.cmp(&b.path))
    }
}

/// Files outside ignored subfolders whose lowercased name passes `keep`.
fn walk_outputs(root: &Path, keep: impl Fn(&str) -> bool) -> Vec<BuildOutput> {
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(is_dir
                && entry.depth() > 0
                && IGNORED_COMPONENTS
                    .iter()
                    .any(|c| name.eq_ignore_ascii_case(c)))
        })
        .build();

    walker
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_some_and(|t| t.is_file()))
        .filter(|e| keep(&e.file_name().to_string_lossy().to_ascii_lowercase()))
        .filter_map(|e| {
            let modified = e.metadata().ok()?.modified().ok()?;
            Some(BuildOutput {
                path: e.into_path(),
                modified,
            })
        })
        .collect()
}

/// Best rank of any folder between `root` and the file; unranked sorts last.
fn rank_in(priority: &FrameworkPriority, root: &Path, path: &Path) -> usize {
    let Ok(rel) = path.strip_prefix(root) else {
        return usize::MAX;
    };
    rel.parent()
        .into_iter()
        .flat_map(|p| p.components())
        .filter_map(|c| priority.rank(&c.as_os_str().to_string_lossy()))
        .min()
        .unwrap_or(usize::MAX)
}
