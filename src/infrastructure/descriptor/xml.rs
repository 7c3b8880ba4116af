//! Project descriptor XML parsing
//!
//! Walks the descriptor once with `quick-xml`, collecting references, item
//! patterns and the properties flavor detection needs.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::domain::entities::{DirectReference, PackageReference, ProjectDescriptor};
use crate::domain::ports::DescriptorError;
use crate::domain::value_objects::ItemPattern;

/// Item kinds whose `Include`/`Remove` values name project files.
const FILE_ITEM_KINDS: &[&str] = &[
    "Page",
    "Compile",
    "None",
    "Content",
    "ApplicationDefinition",
    "AvaloniaXaml",
    "MauiXaml",
    "EmbeddedResource",
];

#[derive(Debug)]
enum Pending {
    Package(PackageReference),
    Direct(DirectReference),
}

#[derive(Debug)]
struct Frame {
    name: String,
    pending: Option<Pending>,
}

#[derive(Debug)]
pub struct ParsedDescriptor {
    pub descriptor: ProjectDescriptor,
    /// Root element is `Project`; anything else yields a bare descriptor.
    pub is_project: bool,
}

/// Parse descriptor text. Flavor is left as `Unknown`; detection needs the
/// filesystem and runs afterwards.
pub fn parse_descriptor(path: &Path, content: &str) -> Result<ParsedDescriptor, DescriptorError> {
    let malformed = |message: String| DescriptorError::MalformedDescriptor {
        path: path.to_path_buf(),
        message,
    };

    let mut descriptor = ProjectDescriptor::new(path.to_path_buf());
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut saw_root = false;
    let mut is_project = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Start(e) => {
                if stack.is_empty() {
                    if saw_root {
                        return Err(malformed("multiple root elements".to_string()));
                    }
                    saw_root = true;
                    is_project = read_root(&e, &mut descriptor).map_err(malformed)?;
                }
                let frame = open_element(&e, &mut descriptor).map_err(malformed)?;
                stack.push(frame);
            }
            Event::Empty(e) => {
                if stack.is_empty() {
                    if saw_root {
                        return Err(malformed("multiple root elements".to_string()));
                    }
                    saw_root = true;
                    is_project = read_root(&e, &mut descriptor).map_err(malformed)?;
                }
                let frame = open_element(&e, &mut descriptor).map_err(malformed)?;
                close_element(frame, &mut descriptor);
            }
            Event::End(_) => {
                if let Some(frame) = stack.pop() {
                    close_element(frame, &mut descriptor);
                }
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(|e| malformed(e.to_string()))?;
                apply_text(&mut stack, &text, &mut descriptor);
            }
            Event::CData(c) => {
                let bytes = c.into_inner();
                let text = String::from_utf8_lossy(&bytes);
                apply_text(&mut stack, &text, &mut descriptor);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_root {
        return Err(malformed("document has no root element".to_string()));
    }
    if let Some(open) = stack.last() {
        return Err(malformed(format!(
            "unexpected end of document inside <{}>",
            open.name
        )));
    }

    if !is_project {
        let mut bare = ProjectDescriptor::new(path.to_path_buf());
        bare.sdk = descriptor.sdk;
        return Ok(ParsedDescriptor {
            descriptor: bare,
            is_project,
        });
    }

    Ok(ParsedDescriptor {
        descriptor,
        is_project,
    })
}

fn read_root(e: &BytesStart<'_>, descriptor: &mut ProjectDescriptor) -> Result<bool, String> {
    let is_project = e.local_name().as_ref() == b"Project";
    if let Some(sdk) = attribute(e, b"Sdk")? {
        if !sdk.trim().is_empty() {
            descriptor.sdk = Some(sdk.trim().to_string());
            descriptor.auto_include = is_project;
        }
    }
    Ok(is_project)
}

fn open_element(e: &BytesStart<'_>, descriptor: &mut ProjectDescriptor) -> Result<Frame, String> {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
    let mut pending = None;

    match name.as_str() {
        "ProjectReference" => {
            if let Some(include) = attribute(e, b"Include")? {
                let include = include.trim();
                if !include.is_empty() {
                    descriptor.references.projects.push(include.to_string());
                }
            }
        }
        "PackageReference" => {
            if let Some(include) = attribute(e, b"Include")? {
                let include = include.trim();
                if !include.is_empty() {
                    let version = attribute(e, b"Version")?
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty());
                    pending = Some(Pending::Package(PackageReference::new(include, version)));
                }
            }
        }
        "Reference" => {
            if let Some(include) = attribute(e, b"Include")? {
                let include = include.trim();
                if !include.is_empty() {
                    pending = Some(Pending::Direct(DirectReference {
                        name: include.to_string(),
                        hint_path: None,
                    }));
                }
            }
        }
        kind if FILE_ITEM_KINDS.contains(&kind) => {
            if let Some(include) = attribute(e, b"Include")? {
                descriptor.includes.extend(ItemPattern::parse_list(&include));
            }
            if let Some(remove) = attribute(e, b"Remove")? {
                descriptor.excludes.extend(ItemPattern::parse_list(&remove));
            }
        }
        _ => {}
    }

    Ok(Frame { name, pending })
}

fn close_element(frame: Frame, descriptor: &mut ProjectDescriptor) {
    match frame.pending {
        Some(Pending::Package(package)) => descriptor.references.packages.push(package),
        Some(Pending::Direct(direct)) => descriptor.references.direct.push(direct),
        None => {}
    }
}

fn apply_text(stack: &mut [Frame], text: &str, descriptor: &mut ProjectDescriptor) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    let Some((current, ancestors)) = stack.split_last_mut() else {
        return;
    };

    match current.name.as_str() {
        "TargetFramework" | "TargetFrameworks" => {
            descriptor.target_frameworks.extend(
                text.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from),
            );
        }
        "Version" => {
            if let Some(Frame {
                pending: Some(Pending::Package(package)),
                ..
            }) = ancestors.last_mut()
            {
                if package.version.is_none() {
                    package.version = Some(text.to_string());
                }
            }
        }
        "HintPath" => {
            if let Some(Frame {
                pending: Some(Pending::Direct(direct)),
                ..
            }) = ancestors.last_mut()
            {
                direct.hint_path = Some(text.to_string());
            }
        }
        _ => {}
    }
}

fn attribute(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>, String> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| err.to_string())?;
        if attr.key.local_name().as_ref() == key {
            let value = attr.unescape_value().map_err(|err| err.to_string())?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(content: &str) -> Result<ProjectDescriptor, DescriptorError> {
        parse_descriptor(Path::new("/src/App/App.csproj"), content).map(|p| p.descriptor)
    }

    #[test]
    fn parses_references_of_every_kind() {
        let descriptor = parse(
            r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <ProjectReference Include="..\Lib\Lib.csproj" />
    <PackageReference Include="Avalonia" Version="11.0.10" />
    <PackageReference Include="UIKitX">
      <Version>2.0.0</Version>
    </PackageReference>
    <Reference Include="Vendor.Charts">
      <HintPath>libs\Vendor.Charts.dll</HintPath>
    </Reference>
  </ItemGroup>
</Project>"#,
        )
        .unwrap();

        assert_eq!(descriptor.references.projects, vec![r"..\Lib\Lib.csproj"]);
        assert_eq!(
            descriptor.references.packages,
            vec![
                PackageReference::new("Avalonia", Some("11.0.10".into())),
                PackageReference::new("UIKitX", Some("2.0.0".into())),
            ]
        );
        assert_eq!(descriptor.references.direct.len(), 1);
        assert_eq!(
            descriptor.references.direct[0].hint_path.as_deref(),
            Some(r"libs\Vendor.Charts.dll")
        );
        assert_eq!(descriptor.target_frameworks, vec!["net8.0"]);
        assert!(descriptor.auto_include);
        assert_eq!(descriptor.sdk.as_deref(), Some("Microsoft.NET.Sdk"));
    }

    #[test]
    fn version_attribute_wins_over_child_element() {
        let descriptor = parse(
            r#"<Project><ItemGroup>
  <PackageReference Include="Kit" Version="1.0.0"><Version>9.9.9</Version></PackageReference>
</ItemGroup></Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.references.packages[0].version.as_deref(), Some("1.0.0"));
    }

    #[test]
    fn collects_include_and_remove_patterns() {
        let descriptor = parse(
            r#"<Project>
  <ItemGroup>
    <Page Include="Views\**\*.xaml" />
    <Compile Include="App.xaml.cs;Program.cs" />
    <Compile Remove="Legacy\**" />
    <Content Include="appsettings.json" />
  </ItemGroup>
</Project>"#,
        )
        .unwrap();

        let includes: Vec<_> = descriptor.includes.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            includes,
            vec!["Views/**/*.xaml", "App.xaml.cs", "Program.cs", "appsettings.json"]
        );
        assert_eq!(descriptor.excludes[0].as_str(), "Legacy/**");
        assert!(!descriptor.auto_include);
    }

    #[test]
    fn multiple_target_frameworks_are_split() {
        let descriptor = parse(
            r#"<Project><PropertyGroup>
<TargetFrameworks>net8.0-android;net8.0-ios</TargetFrameworks>
</PropertyGroup></Project>"#,
        )
        .unwrap();
        assert_eq!(descriptor.target_frameworks, vec!["net8.0-android", "net8.0-ios"]);
    }

    #[test]
    fn references_without_include_are_ignored() {
        let descriptor = parse(
            r#"<Project><ItemGroup>
<PackageReference Update="Kit" Version="2.0" />
<ProjectReference />
</ItemGroup></Project>"#,
        )
        .unwrap();
        assert!(descriptor.references.is_empty());
    }

    #[test]
    fn mismatched_tags_are_malformed() {
        let err = parse("<Project><ItemGroup></Project>").unwrap_err();
        assert!(matches!(err, DescriptorError::MalformedDescriptor { .. }));
    }

    #[test]
    fn truncated_document_is_malformed() {
        let err = parse("<Project><ItemGroup>").unwrap_err();
        assert!(matches!(err, DescriptorError::MalformedDescriptor { .. }));
    }

    #[test]
    fn text_without_root_is_malformed() {
        let err = parse("this is not xml").unwrap_err();
        assert_eq!(
            err,
            DescriptorError::MalformedDescriptor {
                path: PathBuf::from("/src/App/App.csproj"),
                message: "document has no root element".to_string(),
            }
        );
    }

    #[test]
    fn non_project_root_yields_bare_descriptor() {
        let parsed = parse_descriptor(
            Path::new("/src/App/App.csproj"),
            r#"<Solution Sdk="X"><ItemGroup><PackageReference Include="Kit" /></ItemGroup></Solution>"#,
        )
        .unwrap();
        assert!(!parsed.is_project);
        assert!(parsed.descriptor.references.is_empty());
        assert!(!parsed.descriptor.auto_include);
    }
}
