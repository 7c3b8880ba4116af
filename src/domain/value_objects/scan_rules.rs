//! Filesystem scan rules
//!
//! Which files a full project scan picks up and which folders it never enters.

pub const DEFAULT_SCAN_EXTENSIONS: &[&str] = &[
    ".xaml",
    ".axaml",
    ".cs",
    ".config",
    ".json",
    ".xml",
    ".resx",
    ".settings",
];

pub const DEFAULT_EXCLUDED_FOLDERS: &[&str] =
    &["bin", "obj", ".vs", "packages", "node_modules", ".git"];

pub const DEFAULT_GENERATED_SUFFIXES: &[&str] = &[".g.cs", ".g.i.cs"];

/// Descriptor and solution files never appear in a project tree.
const HIDDEN_EXTENSIONS: &[&str] = &[".csproj", ".sln"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRules {
    extensions: Vec<String>,
    exclude_folders: Vec<String>,
    generated_suffixes: Vec<String>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Self::new(
            DEFAULT_SCAN_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_EXCLUDED_FOLDERS.iter().map(|s| s.to_string()).collect(),
            DEFAULT_GENERATED_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl ScanRules {
    /// Values are compared case-insensitively; extensions may omit the dot.
    pub fn new(
        extensions: Vec<String>,
        exclude_folders: Vec<String>,
        generated_suffixes: Vec<String>,
    ) -> Self {
        let dotted = |s: String| {
            let s = s.to_ascii_lowercase();
            if s.starts_with('.') {
                s
            } else {
                format!(".{s}")
            }
        };
        Self {
            extensions: extensions.into_iter().map(dotted).collect(),
            exclude_folders: exclude_folders
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
            generated_suffixes: generated_suffixes
                .into_iter()
                .map(|s| s.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn is_excluded_folder(&self, name: &str) -> bool {
        let name = name.to_ascii_lowercase();
        self.exclude_folders.iter().any(|f| *f == name)
    }

    pub fn excluded_folders(&self) -> &[String] {
        &self.exclude_folders
    }

    pub fn has_scanned_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.extensions.iter().any(|ext| lower.ends_with(ext.as_str()))
    }

    /// Generated sources, descriptors and solutions stay out of the tree.
    pub fn is_hidden(&self, file_name: &str) -> bool {
        let lower = file_name.to_ascii_lowercase();
        self.generated_suffixes
            .iter()
            .map(String::as_str)
            .chain(HIDDEN_EXTENSIONS.iter().copied())
            .any(|suffix| lower.ends_with(suffix))
    }
}
