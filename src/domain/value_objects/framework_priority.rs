//! Framework and configuration priority lists
//!
//! Ordered name lists where an earlier entry is preferred. Lookups ignore case.

use serde::{Deserialize, Serialize};

/// Package `lib/<tfm>` folders, newest desktop-oriented targets first.
pub const DEFAULT_PACKAGE_FRAMEWORKS: &[&str] = &[
    "net10.0-windows",
    "net10.0",
    "net9.0-windows",
    "net9.0",
    "net8.0-windows",
    "net8.0",
    "net7.0-windows",
    "net7.0",
    "net6.0-windows",
    "net6.0",
    "net5.0-windows",
    "net5.0",
    "netcoreapp3.1",
    "netstandard2.1",
    "netstandard2.0",
    "net48",
    "net472",
    "net471",
    "net47",
    "net462",
    "net461",
    "net46",
    "net45",
];

/// Build configuration folders under the output root.
pub const DEFAULT_CONFIGURATIONS: &[&str] = &["Debug", "Release"];

/// Target folders under a build configuration folder.
pub const DEFAULT_BUILD_TARGETS: &[&str] = &[
    "net10.0",
    "net10.0-windows",
    "net9.0",
    "net9.0-windows",
    "net8.0",
    "net8.0-windows",
    "net7.0",
    "net7.0-windows",
    "net6.0",
    "net6.0-windows",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkPriority(Vec<String>);

impl FrameworkPriority {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn package_defaults() -> Self {
        Self::new(DEFAULT_PACKAGE_FRAMEWORKS.iter().copied())
    }

    pub fn configuration_defaults() -> Self {
        Self::new(DEFAULT_CONFIGURATIONS.iter().copied())
    }

    pub fn build_target_defaults() -> Self {
        Self::new(DEFAULT_BUILD_TARGETS.iter().copied())
    }

    /// Position of `name` in the list, `None` when absent.
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
