use crate::shared::Result;
use serde::Deserialize;
use std::path::Path;

/// The subset of a CycloneDX JSON document that is ingested
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CycloneDxDocument {
    pub metadata: Option<CdxMetadata>,
    #[serde(default)]
    pub components: Vec<CdxComponent>,
    #[serde(default)]
    pub dependencies: Vec<CdxDependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxMetadata {
    pub component: Option<CdxComponent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxComponent {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "bom-ref")]
    pub bom_ref: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub purl: Option<String>,
    pub copyright: Option<String>,
    #[serde(default)]
    pub hashes: Vec<CdxHash>,
    #[serde(default)]
    pub licenses: Vec<CdxLicenseChoice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxHash {
    pub alg: String,
    pub content: String,
}

/// One entry of `licenses`: either a license object or an SPDX expression
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxLicenseChoice {
    pub license: Option<CdxLicense>,
    pub expression: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxLicense {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub text: Option<CdxAttachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdxAttachment {
    pub content: String,
    pub content_type: Option<String>,
    pub encoding: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CdxDependency {
    #[serde(rename = "ref")]
    pub bom_ref: String,
    #[serde(default, rename = "dependsOn")]
    pub depends_on: Vec<String>,
}

/// CycloneDxReader port for existing SBOM documents
pub trait CycloneDxReader {
    /// # Errors
    /// Returns an error if the document cannot be read or is not valid JSON
    fn read_bom(&self, path: &Path) -> Result<CycloneDxDocument>;
}
