use super::version::ComponentVersion;
use crate::shared::Result;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Maximum length for component names (security limit)
const MAX_COMPONENT_NAME_LENGTH: usize = 255;

/// Maximum length for raw version strings (git URLs can be long)
const MAX_VERSION_LENGTH: usize = 1024;

/// Namespace used for components built from the analyzed workspace itself
const LOCAL_NAMESPACE: &str = "pkg:bomgraph";

/// Stable component identity.
///
/// Equality and hashing ignore ASCII case, so `pkg:npm/LeftPad@1.0.0` and
/// `pkg:npm/leftpad@1.0.0` denote the same node.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BomRef(String);

impl BomRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds the ref for a component of the given ecosystem and kind.
    ///
    /// Root components live under a separate namespace so a locally built
    /// project never collides with a published package of the same name.
    pub fn synthesize(ecosystem: Ecosystem, kind: ComponentKind, name: &str, version: &str) -> Self {
        let prefix = match kind {
            ComponentKind::Root => format!("{}/{}/", LOCAL_NAMESPACE, ecosystem.as_str()),
            ComponentKind::Library | ComponentKind::Application => {
                format!("pkg:{}/", ecosystem.as_str())
            }
        };
        Self(format!("{}{}@{}", prefix, name, version))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for BomRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for BomRef {}

impl Hash for BomRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for byte in self.0.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for BomRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Build ecosystem a component was discovered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    NuGet,
    Poetry,
    Generic,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::NuGet => "nuget",
            Ecosystem::Poetry => "poetry",
            Ecosystem::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Root,
    Library,
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HashAlgorithm {
    #[serde(rename = "UNKNOWN")]
    Unknown,
    #[serde(rename = "MD5")]
    Md5,
    #[serde(rename = "SHA-1")]
    Sha1,
    #[serde(rename = "SHA-256")]
    Sha256,
    #[serde(rename = "SHA-384")]
    Sha384,
    #[serde(rename = "SHA-512")]
    Sha512,
    #[serde(rename = "SHA3-256")]
    Sha3_256,
    #[serde(rename = "SHA3-384")]
    Sha3_384,
    #[serde(rename = "SHA3-512")]
    Sha3_512,
    #[serde(rename = "BLAKE2b-256")]
    Blake2b256,
    #[serde(rename = "BLAKE2b-384")]
    Blake2b384,
    #[serde(rename = "BLAKE2b-512")]
    Blake2b512,
    #[serde(rename = "BLAKE3")]
    Blake3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BomHash {
    pub algorithm: HashAlgorithm,
    pub content: String,
}

impl BomHash {
    pub fn new(algorithm: HashAlgorithm, content: impl Into<String>) -> Self {
        Self {
            algorithm,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BomLicense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl BomLicense {
    pub fn has_identifier(&self) -> bool {
        self.id.is_some() || self.url.is_some() || self.name.is_some() || self.expression.is_some()
    }
}

/// A uniquely identified software unit in the component graph
#[derive(Debug, Clone, Serialize)]
pub struct Component {
    #[serde(rename = "ref")]
    bom_ref: BomRef,
    name: String,
    version: String,
    #[serde(skip)]
    parsed_version: ComponentVersion,
    ecosystem: Ecosystem,
    kind: ComponentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<BomLicense>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<BomHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    groups: BTreeSet<String>,
}

impl Component {
    /// Creates a component whose ref is synthesized from its ecosystem and kind.
    pub fn new(ecosystem: Ecosystem, name: &str, version: &str, kind: ComponentKind) -> Result<Self> {
        let bom_ref = BomRef::synthesize(ecosystem, kind, name, version);
        Self::with_ref(bom_ref, ecosystem, name, version, kind)
    }

    /// Creates a component with an externally supplied ref (e.g. an ingested purl).
    pub fn with_ref(
        bom_ref: BomRef,
        ecosystem: Ecosystem,
        name: &str,
        version: &str,
        kind: ComponentKind,
    ) -> Result<Self> {
        if name.trim().is_empty() {
            anyhow::bail!("Component name cannot be empty");
        }
        if name.len() > MAX_COMPONENT_NAME_LENGTH {
            anyhow::bail!(
                "Component name is too long ({} bytes). Maximum allowed: {} bytes",
                name.len(),
                MAX_COMPONENT_NAME_LENGTH
            );
        }
        if version.trim().is_empty() {
            anyhow::bail!("Version of component '{}' cannot be empty", name);
        }
        if version.len() > MAX_VERSION_LENGTH {
            anyhow::bail!(
                "Version of component '{}' is too long ({} bytes). Maximum allowed: {} bytes",
                name,
                version.len(),
                MAX_VERSION_LENGTH
            );
        }

        Ok(Self {
            bom_ref,
            name: name.to_string(),
            version: version.to_string(),
            parsed_version: ComponentVersion::parse(version),
            ecosystem,
            kind,
            license: None,
            hash: None,
            copyright: None,
            source: None,
            groups: BTreeSet::new(),
        })
    }

    pub fn bom_ref(&self) -> &BomRef {
        &self.bom_ref
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn parsed_version(&self) -> &ComponentVersion {
        &self.parsed_version
    }

    pub fn ecosystem(&self) -> Ecosystem {
        self.ecosystem
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.kind == ComponentKind::Root
    }

    pub fn license(&self) -> Option<&BomLicense> {
        self.license.as_ref()
    }

    pub fn hash(&self) -> Option<&BomHash> {
        self.hash.as_ref()
    }

    pub fn copyright(&self) -> Option<&str> {
        self.copyright.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    // Setters only ever enrich: a later encounter without the value keeps
    // what an earlier file already recorded.

    pub fn set_license(&mut self, license: Option<BomLicense>) -> &mut Self {
        if let Some(license) = license {
            self.license = Some(license);
        }
        self
    }

    pub fn set_hash(&mut self, hash: Option<BomHash>) -> &mut Self {
        if let Some(hash) = hash {
            self.hash = Some(hash);
        }
        self
    }

    pub fn set_copyright(&mut self, copyright: Option<String>) -> &mut Self {
        if let Some(copyright) = copyright.filter(|c| !c.trim().is_empty()) {
            self.copyright = Some(copyright);
        }
        self
    }

    pub fn set_source(&mut self, source: Option<String>) -> &mut Self {
        if let Some(source) = source {
            self.source = Some(source);
        }
        self
    }

    /// Records the root component that pulled this component in.
    pub fn add_group(&mut self, group: Option<&str>) -> &mut Self {
        if let Some(group) = group.filter(|g| !g.trim().is_empty()) {
            self.groups.insert(group.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_library_and_root_refs_use_distinct_namespaces() {
        let library = BomRef::synthesize(Ecosystem::Npm, ComponentKind::Library, "app", "1.0.0");
        let root = BomRef::synthesize(Ecosystem::Npm, ComponentKind::Root, "app", "1.0.0");

        assert_eq!(library.as_str(), "pkg:npm/app@1.0.0");
        assert_eq!(root.as_str(), "pkg:bomgraph/npm/app@1.0.0");
        assert_ne!(library, root);
    }

    #[test]
    fn test_bom_ref_equality_ignores_case() {
        let a = BomRef::new("pkg:nuget/Newtonsoft.Json@13.0.1");
        let b = BomRef::new("pkg:nuget/newtonsoft.json@13.0.1");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_component_new_parses_version() {
        let component =
            Component::new(Ecosystem::NuGet, "Serilog", "3.1.1", ComponentKind::Library).unwrap();
        assert_eq!(component.bom_ref().as_str(), "pkg:nuget/Serilog@3.1.1");
        assert!(component.parsed_version().as_semantic().is_some());
        assert!(!component.is_root());
    }

    #[test]
    fn test_component_new_rejects_empty_fields() {
        assert!(Component::new(Ecosystem::Npm, "", "1.0.0", ComponentKind::Library).is_err());
        assert!(Component::new(Ecosystem::Npm, "leftpad", " ", ComponentKind::Library).is_err());
    }

    #[test]
    fn test_setters_never_erase_existing_values() {
        let mut component =
            Component::new(Ecosystem::Npm, "leftpad", "1.0.0", ComponentKind::Library).unwrap();
        component.set_license(Some(BomLicense {
            id: Some("MIT".to_string()),
            ..Default::default()
        }));
        component.set_license(None).set_copyright(Some("   ".to_string()));

        assert_eq!(component.license().unwrap().id.as_deref(), Some("MIT"));
        assert!(component.copyright().is_none());
    }

    #[test]
    fn test_add_group_ignores_blank() {
        let mut component =
            Component::new(Ecosystem::NuGet, "App", "1.0.0", ComponentKind::Root).unwrap();
        component.add_group(Some("App.sln")).add_group(None).add_group(Some(""));
        assert_eq!(component.groups().len(), 1);
        assert!(component.groups().contains("App.sln"));
    }
}
