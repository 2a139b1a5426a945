use super::component::{BomHash, BomLicense, BomRef, Component};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// Tool name recorded in every generated BOM
pub const TOOL_NAME: &str = "bomgraph";

/// Flattened dependency record: one component and everything it depends on
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomDependency {
    #[serde(rename = "ref")]
    pub bom_ref: BomRef,
    #[serde(rename = "dependsOn")]
    pub depends_on: Vec<BomRef>,
}

impl BomDependency {
    pub fn new(bom_ref: BomRef, depends_on: Vec<BomRef>) -> Self {
        Self { bom_ref, depends_on }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomMetadata {
    pub key: String,
    pub value: String,
}

impl BomMetadata {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A plain file recorded in the BOM (as opposed to a package)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomFile {
    pub path: String,
    pub hash: BomHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<BomLicense>,
}

impl BomFile {
    pub fn new(path: impl Into<String>, hash: BomHash) -> Self {
        Self {
            path: path.into(),
            hash,
            license: None,
        }
    }
}

/// The aggregate handed to formatters once analysis is complete
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bom {
    pub name: String,
    pub version: String,
    pub tool_name: String,
    pub tool_version: String,
    pub timestamp: String,
    pub serial_number: String,
    pub metadata: Vec<BomMetadata>,
    pub components: Vec<Component>,
    pub dependencies: Vec<BomDependency>,
    pub files: Vec<BomFile>,
}

impl Bom {
    /// Creates an empty BOM stamped with the current time and a fresh serial number.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            tool_name: TOOL_NAME.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
            serial_number: format!("urn:uuid:{}", Uuid::new_v4()),
            metadata: Vec::new(),
            components: Vec::new(),
            dependencies: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn find_component(&self, bom_ref: &BomRef) -> Option<&Component> {
        self.components.iter().find(|c| c.bom_ref() == bom_ref)
    }

    pub fn find_dependency(&self, bom_ref: &BomRef) -> Option<&BomDependency> {
        self.dependencies.iter().find(|d| &d.bom_ref == bom_ref)
    }

    /// Returns every dependency ref that has no matching component.
    pub fn dangling_refs(&self) -> Vec<&BomRef> {
        self.dependencies
            .iter()
            .flat_map(|d| std::iter::once(&d.bom_ref).chain(d.depends_on.iter()))
            .filter(|r| self.find_component(r).is_none())
            .collect()
    }
}
