//! Output Rendering
//!
//! Text renderers return strings so commands decide where they go; JSON
//! output is the serialized report.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use is_terminal::IsTerminal;
use serde::Serialize;

use crate::application::{ProjectReport, WorkspaceReport};
use crate::domain::entities::{ArtifactOrigin, FileEntry, Flavor, FolderEntry};
use crate::domain::value_objects::Diagnostic;

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Glyphs for output rendering
struct Icons {
    branch: &'static str,
    last: &'static str,
    pipe: &'static str,
    blank: &'static str,
    check: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            branch: "├── ",
            last: "└── ",
            pipe: "│   ",
            blank: "    ",
            check: "✓",
            warn: "⚠",
        }
    }

    fn ascii() -> Self {
        Self {
            branch: "|-- ",
            last: "`-- ",
            pipe: "|   ",
            blank: "    ",
            check: "[+]",
            warn: "[!]",
        }
    }
}

/// Whether stdout can show box-drawing glyphs.
pub fn stdout_supports_unicode() -> bool {
    supports_unicode_with(|key| std::env::var(key).ok(), std::io::stdout().is_terminal())
}

fn supports_unicode_with(get_env: impl Fn(&str) -> Option<String>, is_tty: bool) -> bool {
    if !is_tty {
        return false;
    }
    let term = get_env("TERM").unwrap_or_default();
    if term.eq_ignore_ascii_case("dumb") {
        return false;
    }
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .find_map(|key| get_env(key).filter(|v| !v.is_empty()))
        .map(|locale| {
            let locale = locale.to_ascii_lowercase();
            locale.contains("utf-8") || locale.contains("utf8")
        })
        .unwrap_or(cfg!(windows))
}

fn modified_time(path: &Path) -> Option<DateTime<Local>> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Local>::from)
}

/// Text renderer for workspace reports
#[derive(Debug, Clone, Copy)]
pub struct TextRenderer {
    /// Whether to use unicode glyphs
    pub unicode: bool,
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl TextRenderer {
    pub fn new(unicode: bool, verbose: u8) -> Self {
        Self { unicode, verbose }
    }

    fn icons(&self) -> Icons {
        if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        }
    }

    pub fn render_tree(&self, report: &WorkspaceReport) -> String {
        let icons = self.icons();
        let mut out = String::new();
        for project in report.roots() {
            let _ = writeln!(out, "{}", project_heading(project));
            if let Some(tree) = &project.tree {
                if tree.is_empty() {
                    let _ = writeln!(out, "{}(no files)", icons.last);
                } else {
                    write_folder(&mut out, &tree.root, "", &icons);
                }
            }
        }
        self.append_diagnostics(&mut out, &report.diagnostics);
        out
    }

    pub fn render_refs(&self, report: &WorkspaceReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {} resolved binaries",
            report.target.display(),
            report.artifacts.len()
        );
        let width = report
            .artifacts
            .iter()
            .map(|a| a.logical_name.len())
            .max()
            .unwrap_or(0);
        for (i, artifact) in report.artifacts.iter().enumerate() {
            let modified = modified_time(&artifact.path)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:>3}. {:<width$}  {:<15}  {}  {}",
                i + 1,
                artifact.logical_name,
                artifact.origin.label(),
                modified,
                artifact.path.display(),
            );
            if self.verbose > 0 {
                let _ = writeln!(out, "       declared by {}", artifact.declared_by.display());
            }
        }
        self.append_diagnostics(&mut out, &report.diagnostics);
        out
    }

    pub fn render_palette(&self, report: &WorkspaceReport) -> String {
        let icons = self.icons();
        let mut out = String::new();
        for batch in &report.catalog {
            let _ = writeln!(out, "{} ({})", batch.module, batch.path.display());
            for control in &batch.controls {
                let _ = writeln!(out, "  {} {}", icons.check, control.full_name());
            }
        }
        let _ = writeln!(
            out,
            "{} controls in {} modules ({} without controls, {} skipped)",
            report.control_count(),
            report.catalog.len(),
            report.introspection.empty.len(),
            report.introspection.skipped.len()
        );
        self.append_diagnostics(&mut out, &report.diagnostics);
        out
    }

    pub fn render_flavor(&self, report: &WorkspaceReport) -> String {
        let mut out = String::new();
        for project in report.roots() {
            let _ = writeln!(
                out,
                "{}: {} ({})",
                project.name, project.flavor, project.flavor_rule
            );
        }
        out
    }

    fn append_diagnostics(&self, out: &mut String, diagnostics: &[Diagnostic]) {
        if diagnostics.is_empty() {
            return;
        }
        let icons = self.icons();
        let _ = writeln!(out);
        for diagnostic in diagnostics {
            let _ = writeln!(out, "{} {}", icons.warn, diagnostic);
        }
    }
}

fn project_heading(project: &ProjectReport) -> String {
    format!(
        "{} [{}] {}",
        project.name,
        project.flavor,
        project.path.display()
    )
}

fn write_folder(out: &mut String, folder: &FolderEntry, prefix: &str, icons: &Icons) {
    let count = folder.folders.len() + folder.files.len();
    let mut index = 0;

    for child in &folder.folders {
        index += 1;
        let last = index == count;
        let _ = writeln!(
            out,
            "{prefix}{}{}/",
            if last { icons.last } else { icons.branch },
            child.name
        );
        let nested = format!("{prefix}{}", if last { icons.blank } else { icons.pipe });
        write_folder(out, child, &nested, icons);
    }

    for file in &folder.files {
        index += 1;
        let last = index == count;
        write_file(out, file, prefix, last, icons);
    }
}

fn write_file(out: &mut String, file: &FileEntry, prefix: &str, last: bool, icons: &Icons) {
    let _ = writeln!(
        out,
        "{prefix}{}{}",
        if last { icons.last } else { icons.branch },
        file.name
    );
    if let Some(code_behind) = &file.code_behind {
        let nested = format!("{prefix}{}", if last { icons.blank } else { icons.pipe });
        write_file(out, code_behind, &nested, true, icons);
    }
}

#[derive(Debug, Serialize)]
struct ArtifactView<'a> {
    logical_name: &'a str,
    path: &'a Path,
    origin: ArtifactOrigin,
    declared_by: &'a Path,
    modified: Option<DateTime<Local>>,
}

#[derive(Debug, Serialize)]
struct FlavorView<'a> {
    name: &'a str,
    path: &'a PathBuf,
    flavor: Flavor,
    rule: &'static str,
}

pub fn refs_json(report: &WorkspaceReport) -> serde_json::Result<String> {
    let artifacts: Vec<ArtifactView<'_>> = report
        .artifacts
        .iter()
        .map(|a| ArtifactView {
            logical_name: &a.logical_name,
            path: &a.path,
            origin: a.origin,
            declared_by: &a.declared_by,
            modified: modified_time(&a.path),
        })
        .collect();
    serde_json::to_string_pretty(&serde_json::json!({
        "target": report.target,
        "artifacts": artifacts,
        "diagnostics": report.diagnostics,
    }))
}

pub fn flavor_json(report: &WorkspaceReport) -> serde_json::Result<String> {
    let projects: Vec<FlavorView<'_>> = report
        .roots()
        .map(|p| FlavorView {
            name: &p.name,
            path: &p.path,
            flavor: p.flavor,
            rule: p.flavor_rule,
        })
        .collect();
    serde_json::to_string_pretty(&projects)
}

pub fn report_json(report: &WorkspaceReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
