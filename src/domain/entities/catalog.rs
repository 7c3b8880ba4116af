//! Control catalog entity
//!
//! Palette registry of discovered control types, grouped per module. One
//! catalog lives for the whole process; its registered-name memory is what
//! keeps a module from being scanned or listed twice.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlCatalogEntry {
    pub name: String,
    pub namespace: String,
    /// Logical name of the module that defines the type
    pub module: String,
}

impl ControlCatalogEntry {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

/// All controls contributed by one module, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogBatch {
    pub module: String,
    pub path: PathBuf,
    pub controls: Vec<ControlCatalogEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    WithControls,
    Empty,
}

#[derive(Debug, Clone)]
struct RegisteredModule {
    registration: Registration,
    path: PathBuf,
}

#[derive(Debug, Default)]
pub struct ControlCatalog {
    batches: Vec<CatalogBatch>,
    registered: HashMap<String, RegisteredModule>,
    known_controls: HashSet<String>,
    /// Full type name to direct base, for every type any pass loaded
    type_bases: HashMap<String, Option<String>>,
}

impl ControlCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, module: &str) -> bool {
        self.registered.contains_key(&module.to_ascii_lowercase())
    }

    pub fn registration(&self, module: &str) -> Option<Registration> {
        self.registered
            .get(&module.to_ascii_lowercase())
            .map(|m| m.registration)
    }

    /// Adds a batch, sorting its controls by name. Returns `false` and leaves
    /// the catalog untouched when the module is already registered.
    pub fn register_batch(
        &mut self,
        module: impl Into<String>,
        path: PathBuf,
        mut controls: Vec<ControlCatalogEntry>,
    ) -> bool {
        let module = module.into();
        let key = module.to_ascii_lowercase();
        if self.registered.contains_key(&key) {
            return false;
        }

        controls.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.namespace.cmp(&b.namespace)));
        for control in &controls {
            self.known_controls.insert(control.full_name());
        }
        self.registered.insert(
            key,
            RegisteredModule {
                registration: Registration::WithControls,
                path: path.clone(),
            },
        );
        self.batches.push(CatalogBatch {
            module,
            path,
            controls,
        });
        true
    }

    /// Remembers a module that had no qualifying controls so it is not rescanned.
    pub fn mark_empty(&mut self, module: &str, path: &Path) {
        self.registered
            .entry(module.to_ascii_lowercase())
            .or_insert_with(|| RegisteredModule {
                registration: Registration::Empty,
                path: path.to_path_buf(),
            });
    }

    /// Forgets a module registered from a different file than `path`, so the
    /// binary that now wins its name can be scanned. Returns whether anything
    /// was dropped.
    pub fn release_superseded(&mut self, module: &str, path: &Path) -> bool {
        let key = module.to_ascii_lowercase();
        match self.registered.get(&key) {
            Some(existing) if existing.path != path => {}
            _ => return false,
        }
        self.registered.remove(&key);
        if let Some(index) = self
            .batches
            .iter()
            .position(|b| b.module.eq_ignore_ascii_case(module))
        {
            let batch = self.batches.remove(index);
            for control in &batch.controls {
                self.known_controls.remove(&control.full_name());
            }
        }
        true
    }

    /// Whether a fully-qualified type name was registered as a control by any batch.
    pub fn is_known_control(&self, full_name: &str) -> bool {
        self.known_controls.contains(full_name)
    }

    /// Records each loaded type's direct base, abstract types included.
    pub fn record_type_bases<I>(&mut self, types: I)
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        self.type_bases.extend(types);
    }

    /// Direct base of a type loaded by an earlier pass.
    pub fn base_of(&self, full_name: &str) -> Option<&str> {
        self.type_bases.get(full_name).and_then(|b| b.as_deref())
    }

    pub fn batches(&self) -> &[CatalogBatch] {
        &self.batches
    }

    pub fn control_count(&self) -> usize {
        self.batches.iter().map(|b| b.controls.len()).sum()
    }

    pub fn find_batch(&self, module: &str) -> Option<&CatalogBatch> {
        self.batches
            .iter()
            .find(|b| b.module.eq_ignore_ascii_case(module))
    }
}
