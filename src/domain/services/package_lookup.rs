//! Package cache lookup
//!
//! Finds a package's binaries in a `packages` folder above the project, then
//! in the per-user global cache, choosing the best framework-target subfolder.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::entities::PackageReference;
use crate::domain::value_objects::{FrameworkPriority, SystemModuleFilter};

pub const DEFAULT_LOCAL_FOLDER_NAME: &str = "packages";
pub const DEFAULT_BINARY_FOLDERS: &[&str] = &["lib", "bin"];

/// Folders holding reference stubs, satellites and native bundles.
const SKIPPED_FOLDERS: &[&str] = &["ref", "resources", "runtimes"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    Local,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageBinaries {
    pub package_folder: PathBuf,
    pub framework_folder: PathBuf,
    pub source: CacheKind,
    pub binaries: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageLookup {
    Found(PackageBinaries),
    /// Framework packages never carry palette controls.
    SystemPackage,
    /// A package folder exists but no framework subfolder holds binaries.
    NoBinaries { package_folder: PathBuf },
    NotFound,
}

#[derive(Debug, Clone)]
pub struct PackageLookupOptions {
    pub local_folder_name: String,
    pub binary_folders: Vec<String>,
    pub global_cache: Option<PathBuf>,
    pub frameworks: FrameworkPriority,
    pub system_modules: SystemModuleFilter,
}

impl Default for PackageLookupOptions {
    fn default() -> Self {
        Self {
            local_folder_name: DEFAULT_LOCAL_FOLDER_NAME.to_string(),
            binary_folders: DEFAULT_BINARY_FOLDERS.iter().map(|s| s.to_string()).collect(),
            global_cache: None,
            frameworks: FrameworkPriority::package_defaults(),
            system_modules: SystemModuleFilter::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PackageCacheLookup {
    options: PackageLookupOptions,
}

impl PackageCacheLookup {
    pub fn new(options: PackageLookupOptions) -> Self {
        Self { options }
    }

    pub fn lookup(&self, project_folder: &Path, package: &PackageReference) -> PackageLookup {
        if self.options.system_modules.is_system(&package.name) {
            debug!("skipping system package {}", package.name);
            return PackageLookup::SystemPackage;
        }

        let mut empty_folder = None;

        if let Some(local) = self.find_local_cache(project_folder) {
            if let Some(folder) = select_local_package(&local, package) {
                match self.binaries_in(&folder, CacheKind::Local) {
                    Some(found) => return PackageLookup::Found(found),
                    None => empty_folder = Some(folder),
                }
            }
        }

        if let Some(cache) = &self.options.global_cache {
            if let Some(folder) = select_global_package(cache, package) {
                match self.binaries_in(&folder, CacheKind::Global) {
                    Some(found) => return PackageLookup::Found(found),
                    None => empty_folder = empty_folder.or(Some(folder)),
                }
            }
        }

        match empty_folder {
            Some(package_folder) => PackageLookup::NoBinaries { package_folder },
            None => PackageLookup::NotFound,
        }
    }

    /// Nearest ancestor (the project folder included) holding a package folder.
    pub fn find_local_cache(&self, project_folder: &Path) -> Option<PathBuf> {
        project_folder
            .ancestors()
            .map(|dir| dir.join(&self.options.local_folder_name))
            .find(|candidate| candidate.is_dir())
    }

    fn binaries_in(&self, package_folder: &Path, source: CacheKind) -> Option<PackageBinaries> {
        for subtree in &self.options.binary_folders {
            let root = package_folder.join(subtree);
            if !root.is_dir() {
                continue;
            }
            if let Some((framework_folder, binaries)) = self.select_framework(&root) {
                debug!(
                    "package {} resolved to {} ({} binaries)",
                    package_folder.display(),
                    framework_folder.display(),
                    binaries.len()
                );
                return Some(PackageBinaries {
                    package_folder: package_folder.to_path_buf(),
                    framework_folder,
                    source,
                    binaries,
                });
            }
        }
        None
    }

    /// First prioritized framework folder with candidate binaries, else the
    /// highest-sorting folder with any.
    fn select_framework(&self, root: &Path) -> Option<(PathBuf, Vec<PathBuf>)> {
        let folders: Vec<PathBuf> = subfolders(root)
            .into_iter()
            .filter(|f| {
                let name = folder_name(f);
                !SKIPPED_FOLDERS
                    .iter()
                    .any(|s| name.eq_ignore_ascii_case(s))
            })
            .collect();

        for framework in self.options.frameworks.names() {
            let Some(folder) = folders
                .iter()
                .find(|f| folder_name(f).eq_ignore_ascii_case(framework))
            else {
                continue;
            };
            let binaries = self.candidate_binaries(folder);
            if binaries.is_empty() {
                trace!("{} has no candidate binaries, trying next", folder.display());
                continue;
            }
            return Some((folder.clone(), binaries));
        }

        let mut rest: Vec<&PathBuf> = folders.iter().collect();
        rest.sort_by(|a, b| compare_versions(&folder_name(b), &folder_name(a)));
        rest.into_iter().find_map(|folder| {
            let binaries = self.candidate_binaries(folder);
            (!binaries.is_empty()).then(|| (folder.clone(), binaries))
        })
    }

    fn candidate_binaries(&self, folder: &Path) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(folder) else {
            return Vec::new();
        };
        let mut binaries: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| is_candidate_binary(p, &self.options.system_modules))
            .collect();
        binaries.sort();
        binaries
    }
}

fn is_candidate_binary(path: &Path, system: &SystemModuleFilter) -> bool {
    let name = folder_name(path);
    let lower = name.to_ascii_lowercase();
    if !lower.ends_with(".dll") || lower.ends_with(".resources.dll") {
        return false;
    }
    let stem = &name[..name.len() - ".dll".len()];
    !system.is_system(stem)
}

/// `<name>.<version>` when requested and present, else the highest version of
/// `<name>` / `<name>.<digit...>`.
fn select_local_package(local: &Path, package: &PackageReference) -> Option<PathBuf> {
    let folders = subfolders(local);
    let name = package.name.to_ascii_lowercase();

    if let Some(version) = &package.version {
        let wanted = format!("{name}.{}", version.to_ascii_lowercase());
        if let Some(exact) = folders
            .iter()
            .find(|f| folder_name(f).to_ascii_lowercase() == wanted)
        {
            return Some(exact.clone());
        }
    }

    let prefix = format!("{name}.");
    folders
        .into_iter()
        .filter(|f| {
            let lower = folder_name(f).to_ascii_lowercase();
            lower == name
                || lower
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
        })
        .max_by(|a, b| compare_versions(&folder_name(a), &folder_name(b)))
}

fn select_global_package(cache: &Path, package: &PackageReference) -> Option<PathBuf> {
    let root = cache.join(package.name.to_ascii_lowercase());
    if !root.is_dir() {
        return None;
    }
    if let Some(version) = &package.version {
        let exact = root.join(version);
        if exact.is_dir() {
            return Some(exact);
        }
        debug!(
            "version {} of {} not in global cache, using highest available",
            version, package.name
        );
    }
    subfolders(&root)
        .into_iter()
        .max_by(|a, b| compare_versions(&folder_name(a), &folder_name(b)))
}

fn subfolders(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut folders: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    folders.sort();
    folders
}

fn folder_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Natural ordering: digit runs compare numerically, other runs
/// case-insensitively, so `2.10.0` sorts above `2.9.1`. A trailing `-suffix`
/// marks a prerelease and sorts below the same name without it, so
/// `2.0.0-preview` < `2.0.0` < `2.0.1-beta`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (mut a, mut b) = (a, b);
    loop {
        match (split_run(a), split_run(b)) {
            (None, None) => return Ordering::Equal,
            (None, Some((rb, _))) if rb.starts_with('-') => return Ordering::Greater,
            (Some((ra, _)), None) if ra.starts_with('-') => return Ordering::Less,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some((ra, rest_a)), Some((rb, rest_b))) => {
                let ordering = match (numeric(ra), numeric(rb)) {
                    (Some(na), Some(nb)) => na.cmp(&nb).then_with(|| rb.len().cmp(&ra.len())),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => ra.to_ascii_lowercase().cmp(&rb.to_ascii_lowercase()),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a = rest_a;
                b = rest_b;
            }
        }
    }
}

fn split_run(s: &str) -> Option<(&str, &str)> {
    let first = s.chars().next()?;
    let digit = first.is_ascii_digit();
    let end = s
        .find(|c: char| c.is_ascii_digit() != digit)
        .unwrap_or(s.len());
    Some(s.split_at(end))
}

fn numeric(run: &str) -> Option<u128> {
    if run.starts_with(|c: char| c.is_ascii_digit()) {
        run.parse().ok().or(Some(u128::MAX))
    } else {
        None
    }
}
