//! System module filter
//!
//! Framework and tooling binaries never contribute palette controls, so they
//! are skipped before any file is opened.

const EXACT: &[&str] = &[
    "mscorlib",
    "netstandard",
    "WindowsBase",
    "PresentationCore",
    "PresentationFramework",
    "System",
    "Microsoft",
];

const PREFIXES: &[&str] = &[
    "System.",
    "Microsoft.",
    "Newtonsoft.Json",
    "NuGet.",
    "NETStandard.Library",
    "AvalonEdit",
    "ICSharpCode.",
    "Mono.Cecil",
    "IKVM.",
    "Dirkster.",
    "AvalonDock",
    "WPFToolkit",
    "DynamicDataDisplay",
    "Windows.",
    "UIAutomation",
    "Accessibility",
    "ReachFramework",
    "api-ms-",
    "runtime.",
    "hostfxr",
    "hostpolicy",
    "coreclr",
    "clrjit",
    "dbgshim",
    "mscordaccore",
    "mscordbi",
    "mscorrc",
];

#[derive(Debug, Clone, Default)]
pub struct SystemModuleFilter {
    extra_prefixes: Vec<String>,
}

impl SystemModuleFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extra_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.extra_prefixes = prefixes;
        self
    }

    /// Case-insensitive check of a module or package name against the deny list.
    pub fn is_system(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        EXACT.iter().any(|e| e.eq_ignore_ascii_case(name))
            || PREFIXES
                .iter()
                .any(|p| lower.starts_with(&p.to_ascii_lowercase()))
            || self
                .extra_prefixes
                .iter()
                .any(|p| lower.starts_with(&p.to_ascii_lowercase()))
    }
}
