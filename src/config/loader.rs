//! Configuration loading and layering

use std::fs;
use std::path::{Path, PathBuf};

use super::types::Config;

/// File name of the per-project configuration.
pub const PROJECT_CONFIG_FILE: &str = "quarry.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

/// Values given on the command line; they beat every other layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub configurations: Vec<String>,
    pub global_packages: Option<PathBuf>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if !self.configurations.is_empty() {
            config.build.configurations = self.configurations.clone();
        }
        if let Some(cache) = &self.global_packages {
            config.packages.global_cache = Some(cache.clone());
        }
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning {
                key: key.clone(),
                file: path.to_path_buf(),
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Where the file layers are looked up.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    pub project_folder: Option<PathBuf>,
    pub user_config: Option<PathBuf>,
}

impl ConfigSources {
    pub fn for_project(project_folder: Option<&Path>) -> Self {
        Self {
            project_folder: project_folder.map(Path::to_path_buf),
            user_config: dirs::config_dir().map(|d| d.join("quarry").join("config.toml")),
        }
    }

    /// Project config if present, else user config.
    fn file(&self) -> Option<PathBuf> {
        self.project_folder
            .as_ref()
            .map(|folder| folder.join(PROJECT_CONFIG_FILE))
            .filter(|p| p.is_file())
            .or_else(|| self.user_config.clone().filter(|p| p.is_file()))
    }
}

/// Resolve every layer: CLI, environment, project file, user file, defaults.
pub fn load_layered(
    sources: &ConfigSources,
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<(Config, Vec<ConfigWarning>), ConfigError> {
    let (config, warnings) = match sources.file() {
        Some(path) => {
            tracing::debug!(config = %path.display(), "loading config file");
            load_with_warnings(&path)?
        }
        None => (Config::default(), Vec::new()),
    };
    let mut config = apply_env(config, env);
    overrides.apply(&mut config);
    Ok((config, warnings))
}

/// Apply environment variable overrides from the process environment
pub fn with_env_overrides(config: Config) -> Config {
    apply_env(config, |key| std::env::var(key).ok())
}

fn apply_env(mut config: Config, env: impl Fn(&str) -> Option<String>) -> Config {
    // QUARRY_GLOBAL_PACKAGES wins over the toolchain's own NUGET_PACKAGES
    if let Some(cache) = env("QUARRY_GLOBAL_PACKAGES")
        .or_else(|| env("NUGET_PACKAGES"))
        .filter(|v| !v.trim().is_empty())
    {
        config.packages.global_cache = Some(PathBuf::from(cache.trim()));
    }

    if let Some(list) = env("QUARRY_CONFIGURATIONS").and_then(|v| comma_list(&v)) {
        config.build.configurations = list;
    }

    if let Some(list) = env("QUARRY_FRAMEWORKS").and_then(|v| comma_list(&v)) {
        config.packages.frameworks = list;
    }

    config
}

fn comma_list(value: &str) -> Option<Vec<String>> {
    let items: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    for (i, line) in content.lines().enumerate() {
        if line.contains(needle) {
            return Some(i + 1);
        }
    }
    None
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "build",
        "output_root",
        "configurations",
        "targets",
        "packages",
        "local_folder_name",
        "binary_folders",
        "global_cache",
        "frameworks",
        "scan",
        "extensions",
        "exclude_folders",
        "generated_suffixes",
        "introspection",
        "extra_system_prefixes",
        "base_types",
    ];

    let mut best: Option<(&str, usize)> = None;
    for candidate in CANDIDATES {
        let dist = levenshtein(unknown, candidate);
        best = match best {
            None => Some((candidate, dist)),
            Some((_, best_dist)) if dist < best_dist => Some((candidate, dist)),
            Some(current) => Some(current),
        };
    }

    match best {
        Some((candidate, dist)) if dist <= 2 => Some(candidate.to_string()),
        _ => None,
    }
}

fn levenshtein(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    let mut prev: Vec<usize> = (0..=b_bytes.len()).collect();
    let mut curr = vec![0usize; b_bytes.len() + 1];

    for (i, &ac) in a_bytes.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &bc) in b_bytes.iter().enumerate() {
            let cost = if ac == bc { 0 } else { 1 };
            curr[j + 1] =
                std::cmp::min(std::cmp::min(prev[j + 1] + 1, curr[j] + 1), prev[j] + cost);
        }
        prev.clone_from_slice(&curr);
    }

    prev[b_bytes.len()]
}
