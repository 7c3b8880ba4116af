//! Descriptor, solution and build-output fixtures.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use super::env::write_file;

/// One SDK-style descriptor under construction.
#[derive(Debug, Default, Clone)]
pub struct ProjectFixture {
    sdk: Option<String>,
    target_framework: Option<String>,
    siblings: Vec<String>,
    packages: Vec<(String, Option<String>)>,
    direct: Vec<(String, String)>,
}

impl ProjectFixture {
    pub fn new() -> Self {
        Self {
            sdk: Some("Microsoft.NET.Sdk".into()),
            ..Self::default()
        }
    }

    pub fn sdk(mut self, sdk: &str) -> Self {
        self.sdk = Some(sdk.into());
        self
    }

    pub fn target_framework(mut self, tfm: &str) -> Self {
        self.target_framework = Some(tfm.into());
        self
    }

    /// `ProjectReference`, backslashed the way project files write them.
    pub fn sibling(mut self, include: &str) -> Self {
        self.siblings.push(include.replace('/', "\\"));
        self
    }

    pub fn package(mut self, name: &str, version: Option<&str>) -> Self {
        self.packages
            .push((name.into(), version.map(str::to_string)));
        self
    }

    pub fn direct(mut self, include: &str, hint_path: &str) -> Self {
        self.direct.push((include.into(), hint_path.replace('/', "\\")));
        self
    }

    pub fn render(&self) -> String {
        let mut xml = match &self.sdk {
            Some(sdk) => format!("<Project Sdk=\"{sdk}\">\n"),
            None => "<Project>\n".to_string(),
        };
        if let Some(tfm) = &self.target_framework {
            xml.push_str(&format!(
                "  <PropertyGroup>\n    <TargetFramework>{tfm}</TargetFramework>\n  </PropertyGroup>\n"
            ));
        }
        xml.push_str("  <ItemGroup>\n");
        for include in &self.siblings {
            xml.push_str(&format!("    <ProjectReference Include=\"{include}\" />\n"));
        }
        for (name, version) in &self.packages {
            match version {
                Some(v) => xml.push_str(&format!(
                    "    <PackageReference Include=\"{name}\" Version=\"{v}\" />\n"
                )),
                None => xml.push_str(&format!("    <PackageReference Include=\"{name}\" />\n")),
            }
        }
        for (include, hint) in &self.direct {
            xml.push_str(&format!(
                "    <Reference Include=\"{include}\">\n      <HintPath>{hint}</HintPath>\n    </Reference>\n"
            ));
        }
        xml.push_str("  </ItemGroup>\n</Project>\n");
        xml
    }

    /// Writes `<root>/<name>/<name>.csproj` and returns its path.
    pub fn write(&self, root: &Path, name: &str) -> PathBuf {
        let path = root.join(name).join(format!("{name}.csproj"));
        write_file(&path, self.render().as_bytes());
        path
    }
}

/// Writes a `.sln` listing `members` (paths relative to the solution folder).
pub fn write_solution(path: &Path, members: &[&str]) {
    let mut sln = String::from(
        "\nMicrosoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
    );
    for (i, member) in members.iter().enumerate() {
        let name = Path::new(&member.replace('\\', "/"))
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        sln.push_str(&format!(
            "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{}\", \"{{00000000-0000-0000-0000-{:012}}}\"\nEndProject\n",
            member.replace('/', "\\"),
            i + 1
        ));
    }
    sln.push_str("Global\nEndGlobal\n");
    write_file(path, sln.as_bytes());
}

/// Drops `bin/<configuration>/<target>/<name>.dll` next to a project.
pub fn write_build_output(
    project_folder: &Path,
    configuration: &str,
    target: &str,
    name: &str,
    image: &[u8],
) -> PathBuf {
    let path = project_folder
        .join("bin")
        .join(configuration)
        .join(target)
        .join(format!("{name}.dll"));
    write_file(&path, image);
    path
}

/// Pushes a file's mtime `secs` into the past.
pub fn age(path: &Path, secs: u64) {
    let file = std::fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(SystemTime::now() - Duration::from_secs(secs))
        .expect("Failed to set mtime");
}
