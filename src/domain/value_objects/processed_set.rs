//! Processed set value object
//!
//! Descriptor paths already visited in one resolution session. Membership is
//! the gate that makes cycles and diamonds resolve exactly once.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    seen: HashSet<PathBuf>,
    order: Vec<PathBuf>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `path` visited. Returns `false` when it already was.
    pub fn insert(&mut self, path: &Path) -> bool {
        if self.seen.contains(path) {
            return false;
        }
        self.seen.insert(path.to_path_buf());
        self.order.push(path.to_path_buf());
        true
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Visited paths in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.order.iter()
    }
}
