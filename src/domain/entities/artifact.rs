//! Resolved artifact entity
//!
//! A concrete binary found for a project, package, or direct reference.

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactOrigin {
    OwnOutput,
    SiblingProject,
    Package,
    Direct,
}

impl ArtifactOrigin {
    /// Higher wins when two artifacts share a logical name.
    fn precedence(&self) -> u8 {
        match self {
            ArtifactOrigin::OwnOutput => 3,
            ArtifactOrigin::SiblingProject => 2,
            ArtifactOrigin::Direct => 1,
            ArtifactOrigin::Package => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactOrigin::OwnOutput => "own-output",
            ArtifactOrigin::SiblingProject => "sibling-project",
            ArtifactOrigin::Package => "package",
            ArtifactOrigin::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    pub path: PathBuf,
    /// File name without extension
    pub logical_name: String,
    pub origin: ArtifactOrigin,
    /// Descriptor whose reference produced this artifact
    pub declared_by: PathBuf,
}

impl ResolvedArtifact {
    pub fn new(path: PathBuf, origin: ArtifactOrigin, declared_by: &Path) -> Self {
        let logical_name = logical_name_of(&path);
        Self {
            path,
            logical_name,
            origin,
            declared_by: declared_by.to_path_buf(),
        }
    }
}

pub fn logical_name_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Added,
    /// An entry with the same name and lower precedence was overridden in place
    Replaced,
    Duplicate,
}

/// Position in an `ArtifactList`'s change history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ArtifactMark(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Change {
    sequence: usize,
    replaced: bool,
}

/// Ordered, name-deduplicated artifact list for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactList {
    items: Vec<ResolvedArtifact>,
    /// Last add or replace of each item, parallel to `items`
    #[serde(skip)]
    changes: Vec<Change>,
    #[serde(skip)]
    sequence: usize,
}

impl ArtifactList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, artifact: ResolvedArtifact) -> PushOutcome {
        let existing = self
            .items
            .iter()
            .position(|a| a.logical_name.eq_ignore_ascii_case(&artifact.logical_name));

        let outcome = match existing {
            None => {
                self.items.push(artifact);
                self.changes.push(Change {
                    sequence: self.sequence,
                    replaced: false,
                });
                PushOutcome::Added
            }
            Some(index) if artifact.origin.precedence() > self.items[index].origin.precedence() => {
                self.items[index] = artifact;
                self.changes[index] = Change {
                    sequence: self.sequence,
                    replaced: true,
                };
                PushOutcome::Replaced
            }
            Some(_) => return PushOutcome::Duplicate,
        };
        self.sequence += 1;
        outcome
    }

    pub fn contains_name(&self, logical_name: &str) -> bool {
        self.items
            .iter()
            .any(|a| a.logical_name.eq_ignore_ascii_case(logical_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedArtifact> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedArtifact] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn mark(&self) -> ArtifactMark {
        ArtifactMark(self.sequence)
    }

    /// Artifacts added or overridden after `mark`, in list order. An override
    /// keeps the position of the entry it replaced.
    pub fn changed_since(&self, mark: ArtifactMark) -> Vec<ResolvedArtifact> {
        self.items
            .iter()
            .zip(&self.changes)
            .filter(|(_, change)| change.sequence >= mark.0)
            .map(|(artifact, _)| artifact.clone())
            .collect()
    }

    /// Artifacts that overrode an earlier entry after `mark`.
    pub fn replaced_since(&self, mark: ArtifactMark) -> impl Iterator<Item = &ResolvedArtifact> {
        self.items
            .iter()
            .zip(&self.changes)
            .filter(move |(_, change)| change.replaced && change.sequence >= mark.0)
            .map(|(artifact, _)| artifact)
    }
}
