//! Item pattern value object
//!
//! MSBuild `Include`/`Remove` values, matched with gitignore-style globs
//! anchored at the project folder.

use std::path::Path;

use ignore::gitignore::{Gitignore, GitignoreBuilder};

/// One normalized include or remove pattern.
///
/// Backslashes become forward slashes and a leading `./` is dropped, so
/// `Views\**\*.xaml` and `./Views/**/*.xaml` are the same pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemPattern {
    raw: String,
    normalized: String,
}

impl ItemPattern {
    pub fn parse(raw: &str) -> Option<Self> {
        let mut normalized = raw.trim().replace('\\', "/");
        while let Some(rest) = normalized.strip_prefix("./") {
            normalized = rest.to_string();
        }
        let normalized = normalized.trim_start_matches('/').to_string();
        if normalized.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            normalized,
        })
    }

    /// Split a `;`-separated item value into patterns.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(';').filter_map(Self::parse).collect()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    pub fn has_wildcard(&self) -> bool {
        self.normalized.contains(['*', '?'])
    }

    /// Literal folder prefix before the first wildcard segment (`Views` for
    /// `Views/**/*.xaml`, empty for `**/*.cs`).
    pub fn base_folder(&self) -> &str {
        if !self.has_wildcard() {
            return match self.normalized.rfind('/') {
                Some(idx) => &self.normalized[..idx],
                None => "",
            };
        }
        let wildcard_at = self.normalized.find(['*', '?']).unwrap_or(0);
        match self.normalized[..wildcard_at].rfind('/') {
            Some(idx) => &self.normalized[..idx],
            None => "",
        }
    }

    fn gitignore_line(&self) -> String {
        format!("/{}", self.normalized)
    }
}

/// Compiled matcher over a group of patterns.
#[derive(Debug)]
pub struct PatternSet {
    matcher: Gitignore,
    len: usize,
}

impl PatternSet {
    pub fn empty() -> Self {
        Self {
            matcher: Gitignore::empty(),
            len: 0,
        }
    }

    pub fn build<'a>(
        root: &Path,
        patterns: impl IntoIterator<Item = &'a ItemPattern>,
    ) -> Result<Self, PatternError> {
        let mut builder = GitignoreBuilder::new(root);
        builder
            .case_insensitive(true)
            .map_err(|e| PatternError::Build(e.to_string()))?;

        let mut len = 0;
        for pattern in patterns {
            builder
                .add_line(None, &pattern.gitignore_line())
                .map_err(|e| PatternError::Invalid {
                    pattern: pattern.raw().to_string(),
                    message: e.to_string(),
                })?;
            len += 1;
        }

        let matcher = builder
            .build()
            .map_err(|e| PatternError::Build(e.to_string()))?;
        Ok(Self { matcher, len })
    }

    /// Whether the relative file path is matched by any pattern.
    pub fn matches_file(&self, rel_path: &str) -> bool {
        self.len > 0 && self.matcher.matched(rel_path, false).is_ignore()
    }

    /// Like [`matches_file`](Self::matches_file), but a pattern naming one of the
    /// file's parent folders also matches.
    pub fn matches_file_or_parent(&self, rel_path: &str) -> bool {
        self.len > 0
            && self
                .matcher
                .matched_path_or_any_parents(rel_path, false)
                .is_ignore()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("invalid item pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },

    #[error("failed to build pattern matcher: {0}")]
    Build(String),
}
