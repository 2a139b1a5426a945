use crate::shared::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Project entry of a `.sln` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// Path as written in the solution, relative to the solution directory
    pub relative_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionFile {
    pub projects: Vec<SolutionProject>,
}

/// `obj/project.assets.json` written by NuGet restore
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAssets {
    #[serde(default)]
    pub version: u32,
    /// Target moniker (`net8.0`, `net8.0/linux-x64`) to `Name/Version` entries
    #[serde(default)]
    pub targets: IndexMap<String, IndexMap<String, TargetLibrary>>,
    #[serde(default)]
    pub libraries: IndexMap<String, AssetLibrary>,
    #[serde(default)]
    pub package_folders: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub project: AssetProject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LibraryType {
    #[default]
    Package,
    Project,
}

impl LibraryType {
    fn from_field(kind: Option<&str>) -> Self {
        match kind {
            Some(kind) if kind.eq_ignore_ascii_case("project") => LibraryType::Project,
            _ => LibraryType::Package,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetLibrary {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Dependency id to version range
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
}

impl TargetLibrary {
    pub fn library_type(&self) -> LibraryType {
        LibraryType::from_field(self.kind.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetLibrary {
    pub sha512: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Package folder relative to a packages root (`newtonsoft.json/13.0.3`),
    /// or the project file for project references
    pub path: Option<String>,
}

impl AssetLibrary {
    pub fn library_type(&self) -> LibraryType {
        LibraryType::from_field(self.kind.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetProject {
    pub version: Option<String>,
    #[serde(default)]
    pub restore: AssetRestore,
    /// Direct package references of the project, per target framework
    #[serde(default)]
    pub frameworks: IndexMap<String, AssetFramework>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFramework {
    #[serde(default)]
    pub dependencies: IndexMap<String, AssetFrameworkDependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetFrameworkDependency {
    pub target: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRestore {
    pub project_name: Option<String>,
    pub project_path: Option<String>,
    pub packages_path: Option<String>,
    #[serde(default)]
    pub fallback_folders: Vec<String>,
    /// Restore inputs per target framework
    #[serde(default)]
    pub frameworks: IndexMap<String, RestoreFramework>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreFramework {
    /// Keyed by the referenced project file, usually an absolute path
    #[serde(default)]
    pub project_references: IndexMap<String, ProjectReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReference {
    pub project_path: Option<String>,
}

/// Splits a `Name/Version` library key.
pub fn split_library_key(key: &str) -> Option<(&str, &str)> {
    let (name, version) = key.split_once('/')?;
    if name.is_empty() || version.is_empty() {
        return None;
    }
    Some((name, version))
}

/// License element of a `.nuspec`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NuspecLicense {
    Expression(String),
    /// Path of a license file inside the package
    File(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NuspecMetadata {
    pub id: Option<String>,
    pub version: Option<String>,
    pub license: Option<NuspecLicense>,
    pub license_url: Option<String>,
    pub copyright: Option<String>,
}

/// DotnetAssetReader port for solutions, restore output and package metadata
pub trait DotnetAssetReader {
    /// # Errors
    /// Returns an error if the solution cannot be read
    fn read_solution(&self, path: &Path) -> Result<SolutionFile>;

    /// # Errors
    /// Returns an error if the assets file cannot be read or parsed
    fn read_assets(&self, path: &Path) -> Result<ProjectAssets>;

    /// # Errors
    /// Returns an error if the nuspec cannot be read or is not valid XML
    fn read_nuspec(&self, path: &Path) -> Result<NuspecMetadata>;
}

/// Packages roots recorded in an assets file: `packagesPath` first, then fallback folders.
pub fn package_roots(assets: &ProjectAssets) -> Vec<PathBuf> {
    let restore = &assets.project.restore;
    restore
        .packages_path
        .iter()
        .chain(restore.fallback_folders.iter())
        .map(PathBuf::from)
        .collect()
}
