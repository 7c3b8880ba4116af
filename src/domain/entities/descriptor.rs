//! Project descriptor entity
//!
//! The parsed form of one `.csproj`: what the project targets, which files it
//! declares, and what it references.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::value_objects::ItemPattern;

/// UI-framework family a project targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Avalonia,
    Maui,
    Wpf,
    #[default]
    Unknown,
}

impl Flavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::Avalonia => "avalonia",
            Flavor::Maui => "maui",
            Flavor::Wpf => "wpf",
            Flavor::Unknown => "unknown",
        }
    }

    /// Fully-qualified base type a palette control must derive from.
    pub fn base_control_type(&self) -> &'static str {
        match self {
            Flavor::Avalonia | Flavor::Unknown => "Avalonia.Controls.Control",
            Flavor::Wpf => "System.Windows.Controls.Control",
            Flavor::Maui => "Microsoft.Maui.Controls.View",
        }
    }

    /// Framework types that derive from `base_control_type`. Framework
    /// assemblies are never introspected, so their hierarchy is fixed here.
    pub fn framework_controls(&self) -> &'static [&'static str] {
        match self {
            Flavor::Avalonia | Flavor::Unknown => AVALONIA_CONTROLS,
            Flavor::Wpf => WPF_CONTROLS,
            Flavor::Maui => MAUI_CONTROLS,
        }
    }
}

const AVALONIA_CONTROLS: &[&str] = &[
    "Avalonia.Controls.Primitives.TemplatedControl",
    "Avalonia.Controls.Primitives.RangeBase",
    "Avalonia.Controls.Primitives.SelectingItemsControl",
    "Avalonia.Controls.Primitives.HeaderedContentControl",
    "Avalonia.Controls.Primitives.ToggleButton",
    "Avalonia.Controls.ContentControl",
    "Avalonia.Controls.UserControl",
    "Avalonia.Controls.Window",
    "Avalonia.Controls.WindowBase",
    "Avalonia.Controls.TopLevel",
    "Avalonia.Controls.Button",
    "Avalonia.Controls.CheckBox",
    "Avalonia.Controls.RadioButton",
    "Avalonia.Controls.ItemsControl",
    "Avalonia.Controls.ListBox",
    "Avalonia.Controls.ComboBox",
    "Avalonia.Controls.TreeView",
    "Avalonia.Controls.TabControl",
    "Avalonia.Controls.TextBox",
    "Avalonia.Controls.Slider",
    "Avalonia.Controls.ProgressBar",
    "Avalonia.Controls.ScrollViewer",
    "Avalonia.Controls.Expander",
    "Avalonia.Controls.Label",
    "Avalonia.Controls.Decorator",
    "Avalonia.Controls.Border",
    "Avalonia.Controls.Panel",
    "Avalonia.Controls.Grid",
    "Avalonia.Controls.StackPanel",
    "Avalonia.Controls.DockPanel",
    "Avalonia.Controls.WrapPanel",
    "Avalonia.Controls.Canvas",
    "Avalonia.Controls.TextBlock",
    "Avalonia.Controls.Image",
];

/// `System.Windows.Controls.Control` descendants only; WPF panels and
/// `TextBlock` sit beside it under `FrameworkElement`.
const WPF_CONTROLS: &[&str] = &[
    "System.Windows.Window",
    "System.Windows.Controls.ContentControl",
    "System.Windows.Controls.UserControl",
    "System.Windows.Controls.HeaderedContentControl",
    "System.Windows.Controls.HeaderedItemsControl",
    "System.Windows.Controls.ItemsControl",
    "System.Windows.Controls.Primitives.ButtonBase",
    "System.Windows.Controls.Primitives.ToggleButton",
    "System.Windows.Controls.Primitives.RangeBase",
    "System.Windows.Controls.Primitives.Selector",
    "System.Windows.Controls.Primitives.TextBoxBase",
    "System.Windows.Controls.Button",
    "System.Windows.Controls.CheckBox",
    "System.Windows.Controls.RadioButton",
    "System.Windows.Controls.Label",
    "System.Windows.Controls.ListBox",
    "System.Windows.Controls.ListView",
    "System.Windows.Controls.ComboBox",
    "System.Windows.Controls.TreeView",
    "System.Windows.Controls.TabControl",
    "System.Windows.Controls.TextBox",
    "System.Windows.Controls.RichTextBox",
    "System.Windows.Controls.PasswordBox",
    "System.Windows.Controls.Slider",
    "System.Windows.Controls.ProgressBar",
    "System.Windows.Controls.ScrollViewer",
    "System.Windows.Controls.Expander",
    "System.Windows.Controls.GroupBox",
    "System.Windows.Controls.Menu",
    "System.Windows.Controls.MenuItem",
    "System.Windows.Controls.DataGrid",
    "System.Windows.Controls.Calendar",
    "System.Windows.Controls.DatePicker",
    "System.Windows.Controls.Frame",
    "System.Windows.Controls.ToolTip",
];

const MAUI_CONTROLS: &[&str] = &[
    "Microsoft.Maui.Controls.ContentView",
    "Microsoft.Maui.Controls.TemplatedView",
    "Microsoft.Maui.Controls.Layout",
    "Microsoft.Maui.Controls.Grid",
    "Microsoft.Maui.Controls.StackBase",
    "Microsoft.Maui.Controls.StackLayout",
    "Microsoft.Maui.Controls.HorizontalStackLayout",
    "Microsoft.Maui.Controls.VerticalStackLayout",
    "Microsoft.Maui.Controls.AbsoluteLayout",
    "Microsoft.Maui.Controls.FlexLayout",
    "Microsoft.Maui.Controls.ScrollView",
    "Microsoft.Maui.Controls.Border",
    "Microsoft.Maui.Controls.Frame",
    "Microsoft.Maui.Controls.Button",
    "Microsoft.Maui.Controls.ImageButton",
    "Microsoft.Maui.Controls.RadioButton",
    "Microsoft.Maui.Controls.Label",
    "Microsoft.Maui.Controls.InputView",
    "Microsoft.Maui.Controls.Entry",
    "Microsoft.Maui.Controls.Editor",
    "Microsoft.Maui.Controls.SearchBar",
    "Microsoft.Maui.Controls.Image",
    "Microsoft.Maui.Controls.CheckBox",
    "Microsoft.Maui.Controls.Switch",
    "Microsoft.Maui.Controls.Slider",
    "Microsoft.Maui.Controls.Stepper",
    "Microsoft.Maui.Controls.ProgressBar",
    "Microsoft.Maui.Controls.ActivityIndicator",
    "Microsoft.Maui.Controls.DatePicker",
    "Microsoft.Maui.Controls.TimePicker",
    "Microsoft.Maui.Controls.Picker",
    "Microsoft.Maui.Controls.ItemsView",
    "Microsoft.Maui.Controls.StructuredItemsView",
    "Microsoft.Maui.Controls.SelectableItemsView",
    "Microsoft.Maui.Controls.CollectionView",
    "Microsoft.Maui.Controls.CarouselView",
    "Microsoft.Maui.Controls.ListView",
    "Microsoft.Maui.Controls.RefreshView",
    "Microsoft.Maui.Controls.SwipeView",
    "Microsoft.Maui.Controls.IndicatorView",
    "Microsoft.Maui.Controls.BoxView",
    "Microsoft.Maui.Controls.WebView",
    "Microsoft.Maui.Controls.GraphicsView",
    "Microsoft.Maui.Controls.Shapes.Shape",
];

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `PackageReference` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReference {
    pub name: String,
    pub version: Option<String>,
}

impl PackageReference {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

/// A `Reference` item, usually pointing at a vendored binary via `HintPath`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectReference {
    pub name: String,
    pub hint_path: Option<String>,
}

/// Everything a descriptor references, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceSet {
    /// `ProjectReference` include paths, relative to the descriptor folder
    pub projects: Vec<String>,
    pub packages: Vec<PackageReference>,
    pub direct: Vec<DirectReference>,
}

impl ReferenceSet {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.packages.is_empty() && self.direct.is_empty()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.iter().map(|p| p.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDescriptor {
    pub path: PathBuf,
    pub flavor: Flavor,
    /// Name of the detection rule that chose `flavor`.
    pub flavor_rule: &'static str,
    pub sdk: Option<String>,
    pub target_frameworks: Vec<String>,
    pub includes: Vec<ItemPattern>,
    pub excludes: Vec<ItemPattern>,
    /// SDK-style projects include every file under their folder implicitly.
    pub auto_include: bool,
    pub references: ReferenceSet,
}

impl ProjectDescriptor {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            flavor: Flavor::Unknown,
            flavor_rule: "none",
            sdk: None,
            target_frameworks: Vec::new(),
            includes: Vec::new(),
            excludes: Vec::new(),
            auto_include: false,
            references: ReferenceSet::default(),
        }
    }

    /// Project name (descriptor file stem); also the expected output binary name.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn folder(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }
}
