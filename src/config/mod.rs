//! Configuration module for Quarry
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (QUARRY_*, NUGET_PACKAGES)
//! 3. Project config (quarry.toml)
//! 4. User config (~/.config/quarry/config.toml)
//! 5. Built-in defaults (lowest priority)

mod loader;
mod types;

pub use loader::{
    expand_home, load_layered, ConfigError, ConfigOverrides, ConfigSources, ConfigWarning,
    PROJECT_CONFIG_FILE,
};
pub use types::{BuildConfig, Config, IntrospectionConfig, PackagesConfig, ScanConfig};
