//! Flavor detection
//!
//! An ordered table of independent predicates, evaluated first-match-wins.
//! Package names are consulted before target monikers, so a project that
//! references Avalonia while targeting `net8.0-android` is an Avalonia project.

use std::cell::OnceCell;
use std::fs;

use serde::Serialize;
use tracing::debug;

use crate::domain::entities::{Flavor, ProjectDescriptor};
use crate::domain::value_objects::ScanRules;

use super::scan::list_files;

const MAUI_XML_NAMESPACE: &str = "http://schemas.microsoft.com/dotnet/2021/maui";
const AVALONIA_XML_NAMESPACE: &str = "https://github.com/avaloniaui";
const MOBILE_MONIKERS: &[&str] = &["android", "ios", "maccatalyst", "tizen"];
const SNIFFED_MARKUP_FILES: usize = 3;

/// The flavor chosen for a project and the predicate that chose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlavorDecision {
    pub flavor: Flavor,
    pub predicate: &'static str,
}

/// Inputs shared by the predicates. The folder listing is walked at most once.
pub struct FlavorProbe<'a> {
    descriptor: &'a ProjectDescriptor,
    rules: &'a ScanRules,
    files: OnceCell<Vec<String>>,
}

impl<'a> FlavorProbe<'a> {
    pub fn new(descriptor: &'a ProjectDescriptor, rules: &'a ScanRules) -> Self {
        Self {
            descriptor,
            rules,
            files: OnceCell::new(),
        }
    }

    fn files(&self) -> &[String] {
        self.files
            .get_or_init(|| list_files(self.descriptor.folder(), self.rules))
    }

    fn files_with_extension(&self, ext: &str) -> impl Iterator<Item = &String> {
        let ext = ext.to_string();
        self.files()
            .iter()
            .filter(move |f| f.to_ascii_lowercase().ends_with(&ext))
    }
}

type Predicate = fn(&FlavorProbe<'_>) -> Option<Flavor>;

/// Evaluation order is significant.
pub const FLAVOR_PREDICATES: &[(&str, Predicate)] = &[
    ("package_names", by_package_names),
    ("target_moniker", by_target_moniker),
    ("sdk_attribute", by_sdk_attribute),
    ("markup_extensions", by_markup_extensions),
    ("content_sniff", by_content_sniff),
];

/// Decision when no predicate matches.
pub const FALLBACK_FLAVOR: FlavorDecision = FlavorDecision {
    flavor: Flavor::Wpf,
    predicate: "fallback",
};

pub fn detect_flavor(descriptor: &ProjectDescriptor, rules: &ScanRules) -> FlavorDecision {
    let probe = FlavorProbe::new(descriptor, rules);
    for (name, predicate) in FLAVOR_PREDICATES {
        if let Some(flavor) = predicate(&probe) {
            debug!(
                "{}: flavor {} decided by {}",
                descriptor.path.display(),
                flavor,
                name
            );
            return FlavorDecision {
                flavor,
                predicate: name,
            };
        }
    }
    debug!(
        "{}: no predicate matched, using {}",
        descriptor.path.display(),
        FALLBACK_FLAVOR.flavor
    );
    FALLBACK_FLAVOR
}

fn by_package_names(probe: &FlavorProbe<'_>) -> Option<Flavor> {
    let names: Vec<String> = probe
        .descriptor
        .references
        .package_names()
        .map(str::to_ascii_lowercase)
        .collect();
    if names.iter().any(|n| n.contains("avalonia")) {
        return Some(Flavor::Avalonia);
    }
    if names.iter().any(|n| n.contains("microsoft.maui")) {
        return Some(Flavor::Maui);
    }
    None
}

fn by_target_moniker(probe: &FlavorProbe<'_>) -> Option<Flavor> {
    probe
        .descriptor
        .target_frameworks
        .iter()
        .map(|tfm| tfm.to_ascii_lowercase())
        .any(|tfm| tfm.contains("net") && MOBILE_MONIKERS.iter().any(|m| tfm.contains(m)))
        .then_some(Flavor::Maui)
}

fn by_sdk_attribute(probe: &FlavorProbe<'_>) -> Option<Flavor> {
    probe
        .descriptor
        .sdk
        .as_deref()
        .filter(|sdk| sdk.contains("Microsoft.NET.Sdk.Maui"))
        .map(|_| Flavor::Maui)
}

fn by_markup_extensions(probe: &FlavorProbe<'_>) -> Option<Flavor> {
    probe
        .files_with_extension(".axaml")
        .next()
        .map(|_| Flavor::Avalonia)
}

fn by_content_sniff(probe: &FlavorProbe<'_>) -> Option<Flavor> {
    let folder = probe.descriptor.folder();
    for rel in probe
        .files_with_extension(".xaml")
        .take(SNIFFED_MARKUP_FILES)
    {
        let Ok(content) = fs::read_to_string(folder.join(rel)) else {
            continue;
        };
        if let Some(flavor) = sniff_markup(&content) {
            return Some(flavor);
        }
    }
    None
}

/// Flavor named by a markup document's namespace declarations, if any.
pub fn sniff_markup(content: &str) -> Option<Flavor> {
    if content.contains(MAUI_XML_NAMESPACE) {
        Some(Flavor::Maui)
    } else if content.contains(AVALONIA_XML_NAMESPACE) {
        Some(Flavor::Avalonia)
    } else {
        None
    }
}

/// Detect and store the flavor on the descriptor.
pub fn apply_flavor(descriptor: &mut ProjectDescriptor, rules: &ScanRules) -> FlavorDecision {
    let decision = detect_flavor(descriptor, rules);
    descriptor.flavor = decision.flavor;
    descriptor.flavor_rule = decision.predicate;
    decision
}
