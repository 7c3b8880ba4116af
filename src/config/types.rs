//! Configuration type definitions

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::services::{
    BuildOutputOptions, IntrospectionOptions, PackageLookupOptions, DEFAULT_BINARY_FOLDERS,
    DEFAULT_LOCAL_FOLDER_NAME, DEFAULT_OUTPUT_ROOT,
};
use crate::domain::value_objects::{
    FrameworkPriority, ScanRules, SystemModuleFilter, DEFAULT_BUILD_TARGETS,
    DEFAULT_CONFIGURATIONS, DEFAULT_EXCLUDED_FOLDERS, DEFAULT_GENERATED_SUFFIXES,
    DEFAULT_PACKAGE_FRAMEWORKS, DEFAULT_SCAN_EXTENSIONS,
};

use super::loader::{self, ConfigError, ConfigWarning};

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Build output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_output_root")]
    pub output_root: String,

    /// Configuration folder names, most preferred first
    #[serde(default = "default_configurations")]
    pub configurations: Vec<String>,

    /// Target-platform folder names, most preferred first
    #[serde(default = "default_targets")]
    pub targets: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_root: default_output_root(),
            configurations: default_configurations(),
            targets: default_targets(),
        }
    }
}

fn default_output_root() -> String {
    DEFAULT_OUTPUT_ROOT.to_string()
}

fn default_configurations() -> Vec<String> {
    strings(DEFAULT_CONFIGURATIONS)
}

fn default_targets() -> Vec<String> {
    strings(DEFAULT_BUILD_TARGETS)
}

/// Package cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagesConfig {
    #[serde(default = "default_local_folder_name")]
    pub local_folder_name: String,

    /// Subtrees of a package folder that hold framework folders
    #[serde(default = "default_binary_folders")]
    pub binary_folders: Vec<String>,

    /// Global cache override; `~` is expanded
    #[serde(default)]
    pub global_cache: Option<PathBuf>,

    #[serde(default = "default_frameworks")]
    pub frameworks: Vec<String>,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            local_folder_name: default_local_folder_name(),
            binary_folders: default_binary_folders(),
            global_cache: None,
            frameworks: default_frameworks(),
        }
    }
}

fn default_local_folder_name() -> String {
    DEFAULT_LOCAL_FOLDER_NAME.to_string()
}

fn default_binary_folders() -> Vec<String> {
    strings(DEFAULT_BINARY_FOLDERS)
}

fn default_frameworks() -> Vec<String> {
    strings(DEFAULT_PACKAGE_FRAMEWORKS)
}

/// Project tree scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    #[serde(default = "default_exclude_folders")]
    pub exclude_folders: Vec<String>,

    #[serde(default = "default_generated_suffixes")]
    pub generated_suffixes: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_folders: default_exclude_folders(),
            generated_suffixes: default_generated_suffixes(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    strings(DEFAULT_SCAN_EXTENSIONS)
}

fn default_exclude_folders() -> Vec<String> {
    strings(DEFAULT_EXCLUDED_FOLDERS)
}

fn default_generated_suffixes() -> Vec<String> {
    strings(DEFAULT_GENERATED_SUFFIXES)
}

/// Control introspection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct IntrospectionConfig {
    /// Module or package name prefixes treated as framework modules
    #[serde(default)]
    pub extra_system_prefixes: Vec<String>,

    /// Extra fully-qualified base types that mark a control
    #[serde(default)]
    pub base_types: Vec<String>,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub introspection: IntrospectionConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> Result<(Self, Vec<ConfigWarning>), ConfigError> {
        loader::load_with_warnings(path)
    }

    /// Apply environment variable overrides (QUARRY_* and NUGET_PACKAGES)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }

    /// Configured global package cache, else `~/.nuget/packages`.
    pub fn global_cache(&self) -> Option<PathBuf> {
        match &self.packages.global_cache {
            Some(path) => Some(loader::expand_home(path)),
            None => dirs::home_dir().map(|home| home.join(".nuget").join("packages")),
        }
    }

    fn system_modules(&self) -> SystemModuleFilter {
        SystemModuleFilter::new().with_extra_prefixes(self.introspection.extra_system_prefixes.clone())
    }

    pub fn scan_rules(&self) -> ScanRules {
        ScanRules::new(
            self.scan.extensions.clone(),
            self.scan.exclude_folders.clone(),
            self.scan.generated_suffixes.clone(),
        )
    }

    pub fn package_options(&self) -> PackageLookupOptions {
        PackageLookupOptions {
            local_folder_name: self.packages.local_folder_name.clone(),
            binary_folders: self.packages.binary_folders.clone(),
            global_cache: self.global_cache(),
            frameworks: FrameworkPriority::new(&self.packages.frameworks),
            system_modules: self.system_modules(),
        }
    }

    pub fn build_options(&self) -> BuildOutputOptions {
        BuildOutputOptions {
            output_root: self.build.output_root.clone(),
            configurations: FrameworkPriority::new(&self.build.configurations),
            targets: FrameworkPriority::new(&self.build.targets),
        }
    }

    pub fn introspection_options(&self) -> IntrospectionOptions {
        IntrospectionOptions {
            system_modules: self.system_modules(),
            extra_base_types: self.introspection.base_types.clone(),
        }
    }
}
