//! Project tree entity
//!
//! Folder/file hierarchy shown by the file browser. Markup files carry their
//! code-behind file as a child entry.

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Markup,
    Code,
    Config,
    Data,
    Other,
}

impl FileKind {
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xaml" | "axaml" => FileKind::Markup,
            "cs" => FileKind::Code,
            "xml" | "config" | "resx" | "settings" => FileKind::Config,
            "json" => FileKind::Data,
            _ => FileKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    /// Forward-slash path relative to the project folder
    pub relative_path: String,
    pub kind: FileKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_behind: Option<Box<FileEntry>>,
}

impl FileEntry {
    pub fn new(relative_path: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        let kind = FileKind::from_file_name(&name);
        Self {
            name,
            relative_path,
            kind,
            code_behind: None,
        }
    }

    pub fn with_code_behind(mut self, code_behind: FileEntry) -> Self {
        self.code_behind = Some(Box::new(code_behind));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    pub name: String,
    pub relative_path: String,
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
}

impl FolderEntry {
    pub fn new(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            folders: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.iter().all(FolderEntry::is_empty)
    }

    fn collect_files<'a>(&'a self, out: &mut Vec<&'a FileEntry>) {
        out.extend(self.files.iter());
        for folder in &self.folders {
            folder.collect_files(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectTree {
    pub project_folder: PathBuf,
    pub root: FolderEntry,
}

impl ProjectTree {
    pub fn empty(project_folder: PathBuf) -> Self {
        Self {
            project_folder,
            root: FolderEntry::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Top-level listing entries, depth first (code-behind children excluded).
    pub fn files(&self) -> Vec<&FileEntry> {
        let mut out = Vec::new();
        self.root.collect_files(&mut out);
        out
    }

    /// Relative paths of every file, code-behind children included.
    pub fn all_relative_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for file in self.files() {
            paths.push(file.relative_path.clone());
            if let Some(cb) = &file.code_behind {
                paths.push(cb.relative_path.clone());
            }
        }
        paths
    }

    pub fn find(&self, relative_path: &str) -> Option<&FileEntry> {
        self.files()
            .into_iter()
            .find(|f| f.relative_path.eq_ignore_ascii_case(relative_path))
    }
}
