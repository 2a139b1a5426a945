use crate::shared::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProjectToml {
    pub tool: Option<PyProjectTool>,
    /// PEP 621 metadata
    pub project: Option<PyProjectProject>,
}

impl PyProjectToml {
    /// Name and version from `[tool.poetry]`, else from `[project]`.
    pub fn name_and_version(&self) -> Option<(&str, &str)> {
        let poetry = self.tool.as_ref().and_then(|tool| tool.poetry.as_ref());
        let from_poetry = poetry.and_then(|p| Some((p.name.as_deref()?, p.version.as_deref()?)));
        from_poetry.or_else(|| {
            let project = self.project.as_ref()?;
            Some((project.name.as_deref()?, project.version.as_deref()?))
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProjectTool {
    pub poetry: Option<PoetrySection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoetrySection {
    pub name: Option<String>,
    pub version: Option<String>,
    pub license: Option<String>,
    /// Requirement strings or tables (`{ version = "^2.0", optional = true }`)
    #[serde(default)]
    pub dependencies: IndexMap<String, toml::Value>,
    #[serde(default, rename = "group")]
    pub groups: IndexMap<String, PoetryGroup>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoetryGroup {
    #[serde(default)]
    pub dependencies: IndexMap<String, toml::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyProjectProject {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoetryLock {
    #[serde(default, rename = "package")]
    pub packages: Vec<PoetryLockPackage>,
    pub metadata: Option<PoetryLockMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoetryLockPackage {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub files: Vec<PoetryLockFile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoetryLockMetadata {
    #[serde(rename = "lock-version")]
    pub lock_version: Option<String>,
    /// Lock format 1.x keeps per-package files here instead of on the package
    #[serde(default)]
    pub files: IndexMap<String, Vec<PoetryLockFile>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PoetryLockFile {
    pub file: String,
    pub hash: String,
}

/// PoetryManifestReader port for pyproject.toml and poetry.lock
pub trait PoetryManifestReader {
    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML
    fn read_pyproject(&self, path: &Path) -> Result<PyProjectToml>;

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid TOML
    fn read_poetry_lock(&self, path: &Path) -> Result<PoetryLock>;
}
