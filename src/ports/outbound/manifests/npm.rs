use crate::shared::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

/// `license` field of package.json or a lock entry: an SPDX string or the legacy object form
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NpmLicense {
    Text(String),
    Object {
        #[serde(rename = "type")]
        kind: Option<String>,
        url: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    pub name: Option<String>,
    pub version: Option<String>,
    pub license: Option<NpmLicense>,
    #[serde(default)]
    pub licenses: Vec<NpmLicense>,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
}

impl PackageJson {
    /// The declared license, falling back to the first entry of the legacy `licenses` array.
    pub fn declared_license(&self) -> Option<&NpmLicense> {
        self.license.as_ref().or_else(|| self.licenses.first())
    }
}

/// package-lock.json (lockfile versions 1, 2 and 3)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageLockJson {
    pub name: Option<String>,
    pub version: Option<String>,
    #[serde(default)]
    pub lockfile_version: u32,
    /// v2/v3: keyed by install path (`""`, `node_modules/a`, `packages/lib`)
    pub packages: Option<IndexMap<String, LockPackage>>,
    /// v1: keyed by package name, nested for non-hoisted copies
    pub dependencies: Option<IndexMap<String, LockDependency>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPackage {
    pub name: Option<String>,
    pub version: Option<String>,
    pub license: Option<NpmLicense>,
    pub integrity: Option<String>,
    pub resolved: Option<String>,
    #[serde(default)]
    pub link: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub optional_dependencies: IndexMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockDependency {
    pub version: Option<String>,
    pub integrity: Option<String>,
    pub resolved: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub dev: bool,
    #[serde(default)]
    pub requires: IndexMap<String, String>,
    #[serde(default)]
    pub dependencies: IndexMap<String, LockDependency>,
}

/// NpmManifestReader port for package.json and package-lock.json
pub trait NpmManifestReader {
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON
    fn read_package_json(&self, path: &Path) -> Result<PackageJson>;

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid JSON
    fn read_package_lock(&self, path: &Path) -> Result<PackageLockJson>;
}
