//! Solution file parsing

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::locate::DESCRIPTOR_EXTENSION;

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Project\("\{[^}]+\}"\)\s*=\s*"([^"]+)",\s*"([^"]+)",\s*"\{[^}]+\}""#)
        .expect("project line pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub name: String,
    /// Path as written in the solution, with forward slashes
    pub relative_path: String,
}

/// Descriptor entries in file order. Solution folders and non-C# projects
/// are skipped.
pub fn parse_solution(content: &str) -> Vec<SolutionEntry> {
    content
        .lines()
        .filter_map(|line| PROJECT_LINE.captures(line))
        .map(|caps| SolutionEntry {
            name: caps[1].to_string(),
            relative_path: caps[2].trim().replace('\\', "/"),
        })
        .filter(|entry| {
            Path::new(&entry.relative_path)
                .extension()
                .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(DESCRIPTOR_EXTENSION))
        })
        .collect()
}

/// Member descriptor paths resolved against the solution's folder.
pub fn member_paths(solution: &Path, content: &str) -> Vec<PathBuf> {
    let folder = solution.parent().unwrap_or_else(|| Path::new(""));
    parse_solution(content)
        .into_iter()
        .map(|entry| folder.join(entry.relative_path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLUTION: &str = r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "ProjA", "src\ProjA\ProjA.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{2150E333-8FDC-42A3-9474-1A3956D46DE8}") = "Solution Items", "Solution Items", "{22222222-2222-2222-2222-222222222222}"
EndProject
Project("{F2A71F9B-5D33-465A-A702-920D77279786}") = "Tool", "tools\Tool.fsproj", "{33333333-3333-3333-3333-333333333333}"
EndProject
Project("{9A19103F-16F7-4668-BE54-9A1E7A4F7556}") = "ProjB", "src\ProjB\ProjB.csproj", "{44444444-4444-4444-4444-444444444444}"
EndProject
"#;

    #[test]
    fn extracts_descriptor_entries_in_order() {
        let entries = parse_solution(SOLUTION);
        assert_eq!(
            entries,
            vec![
                SolutionEntry {
                    name: "ProjA".into(),
                    relative_path: "src/ProjA/ProjA.csproj".into()
                },
                SolutionEntry {
                    name: "ProjB".into(),
                    relative_path: "src/ProjB/ProjB.csproj".into()
                },
            ]
        );
    }

    #[test]
    fn members_resolve_against_solution_folder() {
        let members = member_paths(Path::new("/work/All.sln"), SOLUTION);
        assert_eq!(
            members,
            vec![
                PathBuf::from("/work/src/ProjA/ProjA.csproj"),
                PathBuf::from("/work/src/ProjB/ProjB.csproj"),
            ]
        );
    }

    #[test]
    fn text_without_project_lines_has_no_members() {
        assert!(parse_solution("Global\nEndGlobal\n").is_empty());
    }
}
