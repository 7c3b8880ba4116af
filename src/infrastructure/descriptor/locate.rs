//! Descriptor location
//!
//! Maps the path a user opened to the descriptor or solution to load.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::ports::DescriptorError;

pub const DESCRIPTOR_EXTENSION: &str = "csproj";
pub const SOLUTION_EXTENSION: &str = "sln";

/// What an open action should load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    Project(PathBuf),
    Solution(PathBuf),
}

impl OpenTarget {
    pub fn path(&self) -> &Path {
        match self {
            OpenTarget::Project(path) | OpenTarget::Solution(path) => path,
        }
    }
}

/// A descriptor file is used as is and a solution file opens solution mode.
/// A folder prefers its own descriptor, then its own solution. Failing both,
/// ancestors are searched nearest first, a descriptor beating a solution in
/// the same folder.
pub fn locate_target(start: &Path) -> Result<OpenTarget, DescriptorError> {
    if start.is_file() {
        return if has_extension(start, SOLUTION_EXTENSION) {
            Ok(OpenTarget::Solution(start.to_path_buf()))
        } else if has_extension(start, DESCRIPTOR_EXTENSION) {
            Ok(OpenTarget::Project(start.to_path_buf()))
        } else {
            locate_target(start.parent().unwrap_or(start))
        };
    }

    if let Some(descriptor) = first_with_extension(start, DESCRIPTOR_EXTENSION) {
        debug!("found descriptor {}", descriptor.display());
        return Ok(OpenTarget::Project(descriptor));
    }
    if let Some(solution) = first_with_extension(start, SOLUTION_EXTENSION) {
        debug!("found solution {}", solution.display());
        return Ok(OpenTarget::Solution(solution));
    }
    for ancestor in start.ancestors().skip(1) {
        if let Some(descriptor) = first_with_extension(ancestor, DESCRIPTOR_EXTENSION) {
            debug!("found descriptor {} in ancestor", descriptor.display());
            return Ok(OpenTarget::Project(descriptor));
        }
        if let Some(solution) = first_with_extension(ancestor, SOLUTION_EXTENSION) {
            debug!("found solution {} in ancestor", solution.display());
            return Ok(OpenTarget::Solution(solution));
        }
    }

    Err(DescriptorError::MissingDescriptor {
        searched: start.to_path_buf(),
    })
}

/// A descriptor in `folder`, else the first one found below it.
pub fn locate_descriptor_below(folder: &Path) -> Result<PathBuf, DescriptorError> {
    if let Some(descriptor) = first_with_extension(folder, DESCRIPTOR_EXTENSION) {
        return Ok(descriptor);
    }

    let mut pending = vec![folder.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut children: Vec<PathBuf> = read_sorted(&dir)
            .into_iter()
            .filter(|p| p.is_dir())
            .collect();
        for child in &children {
            if let Some(descriptor) = first_with_extension(child, DESCRIPTOR_EXTENSION) {
                return Ok(descriptor);
            }
        }
        children.reverse();
        pending.extend(children);
    }

    Err(DescriptorError::MissingDescriptor {
        searched: folder.to_path_buf(),
    })
}

fn first_with_extension(dir: &Path, ext: &str) -> Option<PathBuf> {
    read_sorted(dir)
        .into_iter()
        .find(|p| p.is_file() && has_extension(p, ext))
}

fn read_sorted(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut paths: Vec<PathBuf> = entries.filter_map(Result::ok).map(|e| e.path()).collect();
    paths.sort();
    paths
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn folder_prefers_lexically_first_descriptor() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("Zeta.csproj"));
        touch(&dir.path().join("Alpha.csproj"));
        touch(&dir.path().join("All.sln"));

        assert_eq!(
            locate_target(dir.path()).unwrap(),
            OpenTarget::Project(dir.path().join("Alpha.csproj"))
        );
    }

    #[test]
    fn folder_with_only_solution_opens_solution() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("All.sln"));
        touch(&dir.path().join("App/App.csproj"));

        assert_eq!(
            locate_target(dir.path()).unwrap(),
            OpenTarget::Solution(dir.path().join("All.sln"))
        );
    }

    #[test]
    fn nested_folder_searches_ancestors() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("App.csproj"));
        fs::create_dir_all(dir.path().join("Views/Controls")).unwrap();

        assert_eq!(
            locate_target(&dir.path().join("Views/Controls")).unwrap(),
            OpenTarget::Project(dir.path().join("App.csproj"))
        );
    }

    #[test]
    fn nested_folder_finds_solution_in_ancestor() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("All.sln"));
        fs::create_dir_all(dir.path().join("docs/notes")).unwrap();

        assert_eq!(
            locate_target(&dir.path().join("docs/notes")).unwrap(),
            OpenTarget::Solution(dir.path().join("All.sln"))
        );
    }

    #[test]
    fn nearer_descriptor_beats_outer_solution() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("All.sln"));
        touch(&dir.path().join("src/App/App.csproj"));
        fs::create_dir_all(dir.path().join("src/App/Views")).unwrap();

        assert_eq!(
            locate_target(&dir.path().join("src/App/Views")).unwrap(),
            OpenTarget::Project(dir.path().join("src/App/App.csproj"))
        );
    }

    #[test]
    fn explicit_files_are_used_directly() {
        let dir = tempdir().unwrap();
        let sln = dir.path().join("All.sln");
        let proj = dir.path().join("Lib/Lib.csproj");
        touch(&sln);
        touch(&proj);

        assert_eq!(locate_target(&sln).unwrap(), OpenTarget::Solution(sln));
        assert_eq!(locate_target(&proj).unwrap(), OpenTarget::Project(proj));
    }

    #[test]
    fn descriptor_below_solution_folder() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("src/b/B.csproj"));
        touch(&dir.path().join("src/a/A.csproj"));

        assert_eq!(
            locate_descriptor_below(dir.path()).unwrap(),
            dir.path().join("src/a/A.csproj")
        );
    }

    #[test]
    fn nothing_found_is_missing_descriptor() {
        let dir = tempdir().unwrap();
        let empty = dir.path().join("empty");
        fs::create_dir_all(&empty).unwrap();
        assert!(matches!(
            locate_descriptor_below(&empty),
            Err(DescriptorError::MissingDescriptor { .. })
        ));
    }
}
