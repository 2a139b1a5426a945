use super::{display_path, file_name, Analyzer};
use crate::application::analysis_context::AnalysisContext;
use crate::application::dto::AnalysisSettings;
use crate::ports::outbound::manifests::cyclonedx::{CdxComponent, CdxHash, CdxLicenseChoice};
use crate::ports::outbound::{AnalyzerOption, CycloneDxReader, FileLookup};
use crate::sbom_generation::domain::{
    BomFile, BomHash, BomLicense, BomRef, Component, ComponentKind, Diagnostics, Ecosystem,
    HashAlgorithm, NodeId, SCOPE_KEY,
};
use crate::shared::error::SbomError;
use crate::shared::Result;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::path::Path;

const DISABLE_CYCLONEDX: &str = "disable-cyclonedx";
const UNVERSIONED: &str = "0.0.0";

/// Ingests existing CycloneDX JSON documents into the graph
pub struct CycloneDxAnalyzer<R> {
    reader: R,
    enabled: bool,
}

impl<R> CycloneDxAnalyzer<R>
where
    R: CycloneDxReader + FileLookup,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            enabled: true,
        }
    }
}

impl<R> Analyzer for CycloneDxAnalyzer<R>
where
    R: CycloneDxReader + FileLookup,
{
    fn name(&self) -> &'static str {
        "cyclonedx"
    }

    fn options(&self) -> Vec<AnalyzerOption> {
        vec![AnalyzerOption::flag(
            DISABLE_CYCLONEDX,
            "Disables the CycloneDX analyzer",
        )]
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn before_analysis(&mut self, settings: &AnalysisSettings<'_>) {
        if settings.options.flag(DISABLE_CYCLONEDX) {
            self.enabled = false;
        }
    }

    fn patterns(&self) -> &[&'static str] {
        &["**/*.cdx.json", "**/bom.json"]
    }

    fn can_handle(&self, _context: &AnalysisContext<'_>, path: &Path) -> bool {
        let name = file_name(path);
        name.ends_with(".cdx.json") || name == "bom.json"
    }

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()> {
        tracing::debug!("cyclonedx: ingesting {}", path.display());

        // Discovery already saw this file; its absence means the host changed under us.
        if !self.reader.is_file(path) {
            return Err(SbomError::ManifestNotFound {
                path: path.to_path_buf(),
                suggestion: "Make sure the BOM is not removed while the analysis runs".to_string(),
            }
            .into());
        }

        let document = match self.reader.read_bom(path) {
            Ok(document) => document,
            Err(e) => {
                let shown = display_path(context, path);
                context
                    .add_error(format!("Could not parse CycloneDX document: {:#}", e))
                    .with_context("Path", shown);
                return Ok(());
            }
        };

        // bom-refs and purls of everything added from this document
        let mut refs: HashMap<String, NodeId> = HashMap::new();

        if let Some(root) = document.metadata.as_ref().and_then(|m| m.component.as_ref()) {
            add_component(context, root, ComponentKind::Root, &mut refs);
        }

        for component in &document.components {
            match component.kind.as_deref().unwrap_or_default() {
                "application" => {
                    add_component(context, component, ComponentKind::Application, &mut refs);
                }
                "library" | "framework" => {
                    add_component(context, component, ComponentKind::Library, &mut refs);
                }
                "file" => add_file(context, component),
                other => {
                    context
                        .add_info(format!("Ignoring component of type '{}'", other))
                        .with_context("Name", component.name.clone().unwrap_or_default());
                }
            }
        }

        for dependency in &document.dependencies {
            let Some(from) = lookup(context, &refs, &dependency.bom_ref) else {
                context
                    .add_warning("Component is missing")
                    .with_context(SCOPE_KEY, dependency.bom_ref.as_str());
                continue;
            };

            for target in &dependency.depends_on {
                let Some(to) = lookup(context, &refs, target) else {
                    context
                        .add_warning("Component is missing")
                        .with_context(SCOPE_KEY, target.as_str());
                    continue;
                };
                if let Err(e) = context.connect(from, to, None) {
                    context.add_warning(e.to_string());
                }
            }
        }

        Ok(())
    }
}

fn add_component(
    context: &mut AnalysisContext<'_>,
    source: &CdxComponent,
    kind: ComponentKind,
    refs: &mut HashMap<String, NodeId>,
) {
    let name = source.name.as_deref().unwrap_or_default();
    let version = source
        .version
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(UNVERSIONED);
    let bom_ref = source
        .purl
        .clone()
        .or_else(|| source.bom_ref.clone())
        .unwrap_or_else(|| format!("pkg:generic/{}@{}", name, version));
    let ecosystem = ecosystem_of(source.purl.as_deref());

    let component = match Component::with_ref(BomRef::new(bom_ref.as_str()), ecosystem, name, version, kind) {
        Ok(component) => component,
        Err(e) => {
            context
                .add_warning(format!("Skipping component: {}", e))
                .with_context(SCOPE_KEY, bom_ref);
            return;
        }
    };

    if source.licenses.len() > 1 {
        context
            .add_warning("Component contains more than one license. Only the first one is kept")
            .with_context(SCOPE_KEY, bom_ref.as_str());
    }
    let license = source.licenses.first().and_then(to_license);

    let id = context.add_component(component);
    if let Some(component) = context.component_mut(id) {
        component
            .set_license(license)
            .set_hash(source.hashes.first().map(to_hash))
            .set_copyright(source.copyright.clone());
    }

    refs.insert(bom_ref, id);
    for alias in [&source.bom_ref, &source.purl].into_iter().flatten() {
        refs.insert(alias.clone(), id);
    }
}

fn add_file(context: &mut AnalysisContext<'_>, source: &CdxComponent) {
    let Some(name) = source.name.as_deref().filter(|n| !n.trim().is_empty()) else {
        context.add_warning("Skipping file component without a name");
        return;
    };

    let hash = source
        .hashes
        .first()
        .map(to_hash)
        .unwrap_or_else(|| BomHash::new(HashAlgorithm::Unknown, ""));
    let mut file = BomFile::new(name, hash);
    file.license = source.licenses.first().and_then(to_license);
    context.add_file(file);
}

fn lookup(context: &AnalysisContext<'_>, refs: &HashMap<String, NodeId>, bom_ref: &str) -> Option<NodeId> {
    refs.get(bom_ref)
        .copied()
        .or_else(|| context.find(&BomRef::new(bom_ref)))
}

fn ecosystem_of(purl: Option<&str>) -> Ecosystem {
    let kind = purl
        .and_then(|p| p.strip_prefix("pkg:"))
        .and_then(|p| p.split('/').next())
        .unwrap_or_default();
    match kind.to_ascii_lowercase().as_str() {
        "npm" => Ecosystem::Npm,
        "nuget" => Ecosystem::NuGet,
        _ => Ecosystem::Generic,
    }
}

fn to_license(choice: &CdxLicenseChoice) -> Option<BomLicense> {
    let mut license = BomLicense {
        expression: choice.expression.clone(),
        ..Default::default()
    };

    if let Some(declared) = &choice.license {
        license.id = declared.id.clone();
        license.name = declared.name.clone();
        license.url = declared.url.clone();
        license.text = declared.text.as_ref().and_then(|text| {
            match text.encoding.as_deref() {
                Some(encoding) if encoding.eq_ignore_ascii_case("base64") => STANDARD
                    .decode(text.content.trim())
                    .ok()
                    .and_then(|bytes| String::from_utf8(bytes).ok()),
                _ => Some(text.content.clone()),
            }
        });
    }

    Some(license).filter(|l| l.has_identifier() || l.text.is_some())
}

fn to_hash(hash: &CdxHash) -> BomHash {
    let algorithm = match hash.alg.to_ascii_uppercase().as_str() {
        "MD5" => HashAlgorithm::Md5,
        "SHA-1" => HashAlgorithm::Sha1,
        "SHA-256" => HashAlgorithm::Sha256,
        "SHA-384" => HashAlgorithm::Sha384,
        "SHA-512" => HashAlgorithm::Sha512,
        "SHA3-256" => HashAlgorithm::Sha3_256,
        "SHA3-384" => HashAlgorithm::Sha3_384,
        "SHA3-512" => HashAlgorithm::Sha3_512,
        "BLAKE2B-256" => HashAlgorithm::Blake2b256,
        "BLAKE2B-384" => HashAlgorithm::Blake2b384,
        "BLAKE2B-512" => HashAlgorithm::Blake2b512,
        "BLAKE3" => HashAlgorithm::Blake3,
        _ => HashAlgorithm::Unknown,
    };
    BomHash::new(algorithm, hash.content.clone())
}
