use super::{display_path, file_name, has_segment, Analyzer};
use crate::application::analysis_context::AnalysisContext;
use crate::application::dto::AnalysisSettings;
use crate::ports::outbound::manifests::npm::{
    LockDependency, LockPackage, NpmLicense, PackageJson, PackageLockJson,
};
use crate::ports::outbound::{AnalyzerOption, FileLookup, NpmManifestReader};
use crate::sbom_generation::domain::{
    BomLicense, Component, ComponentKind, Diagnostics, Ecosystem, NodeId,
};
use crate::sbom_generation::policies::LicensePriority;
use crate::sbom_generation::services::{ComponentResolver, Integrity, NpmVersionRange, Resolution};
use crate::shared::Result;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::Path;

const DISABLE_NPM: &str = "disable-npm";
const NO_DEV_DEPENDENCIES: &str = "no-dev-dependencies";

const PACKAGE_JSON: &str = "package.json";
const PACKAGE_LOCK: &str = "package-lock.json";
const NODE_MODULES: &str = "node_modules";

/// A lock entry registered as a component, kept for the edge pass
struct Installed<'l> {
    id: NodeId,
    dependencies: Vec<&'l IndexMap<String, String>>,
}

/// Analyzer for npm projects (package.json + package-lock.json)
pub struct NpmAnalyzer<R> {
    reader: R,
    enabled: bool,
}

impl<R> NpmAnalyzer<R>
where
    R: NpmManifestReader + FileLookup,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            enabled: true,
        }
    }

    fn read_manifest(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Option<PackageJson> {
        if !self.reader.is_file(path) {
            let shown = display_path(context, path);
            context
                .add_error("Could not read package.json")
                .with_context("Path", shown);
            return None;
        }

        match self.reader.read_package_json(path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                let shown = display_path(context, path);
                context
                    .add_error(format!("Could not parse package.json: {:#}", e))
                    .with_context("Path", shown);
                None
            }
        }
    }

    fn read_lock(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Option<PackageLockJson> {
        if !self.reader.is_file(path) {
            let shown = display_path(context, path);
            context
                .add_error("Could not read package-lock.json")
                .with_context("Path", shown);
            return None;
        }

        match self.reader.read_package_lock(path) {
            Ok(lock) => Some(lock),
            Err(e) => {
                let shown = display_path(context, path);
                context
                    .add_error(format!("Could not parse package-lock.json: {:#}", e))
                    .with_context("Path", shown);
                None
            }
        }
    }

    /// License declared by the copy installed under `node_modules`, if one is on disk.
    fn installed_license(&self, package_dir: &Path) -> Option<BomLicense> {
        let manifest_path = package_dir.join(PACKAGE_JSON);
        if !self.reader.is_file(&manifest_path) {
            return None;
        }
        let manifest = self.reader.read_package_json(&manifest_path).ok()?;
        to_license(manifest.declared_license())
    }

    /// Registers every `packages` entry of a v2/v3 lockfile.
    fn add_packages<'l>(
        &self,
        context: &mut AnalysisContext<'_>,
        project_dir: &Path,
        packages: &'l IndexMap<String, LockPackage>,
        skip_dev: bool,
    ) -> Vec<Installed<'l>> {
        let mut installed = Vec::new();

        for (install_path, entry) in packages {
            // "" is the project itself, links point at entries listed separately
            if install_path.is_empty() || entry.link || (skip_dev && entry.dev) {
                continue;
            }

            let package_dir = project_dir.join(install_path);
            let local = !is_installed_path(install_path);
            let name = match entry.name.as_deref() {
                Some(name) => name.to_string(),
                None => package_name_from_path(install_path),
            };
            let Some(version) = entry.version.as_deref() else {
                context
                    .add_warning(format!("Lock entry for {} has no version", name))
                    .with_context("Path", install_path.as_str());
                continue;
            };

            let kind = if local {
                ComponentKind::Root
            } else {
                ComponentKind::Library
            };
            let component = match Component::new(Ecosystem::Npm, &name, version, kind) {
                Ok(component) => component,
                Err(e) => {
                    context
                        .add_warning(format!("Skipping lock entry: {}", e))
                        .with_context("Path", install_path.as_str());
                    continue;
                }
            };

            let id = context.add_component(component);
            let license = LicensePriority::select_license(
                to_license(entry.license.as_ref()),
                self.installed_license(&package_dir),
            );
            if let Some(component) = context.component_mut(id) {
                component
                    .set_hash(entry.integrity.as_deref().and_then(Integrity::from_sri))
                    .set_license(license)
                    .set_source(entry.resolved.clone());
            }

            let mut dependencies = vec![&entry.dependencies, &entry.optional_dependencies];
            if local && !skip_dev {
                dependencies.push(&entry.dev_dependencies);
            }
            installed.push(Installed { id, dependencies });
        }

        installed
    }

    /// Registers the nested `dependencies` tree of a v1 lockfile.
    fn add_legacy_dependencies<'l>(
        &self,
        context: &mut AnalysisContext<'_>,
        install_dir: &Path,
        dependencies: &'l IndexMap<String, LockDependency>,
        skip_dev: bool,
        installed: &mut Vec<Installed<'l>>,
    ) {
        for (name, entry) in dependencies {
            if skip_dev && entry.dev {
                continue;
            }

            let package_dir = install_dir.join(NODE_MODULES).join(name);
            if let Some(version) = entry.version.as_deref() {
                match Component::new(Ecosystem::Npm, name, version, ComponentKind::Library) {
                    Ok(component) => {
                        let id = context.add_component(component);
                        let license = self.installed_license(&package_dir);
                        if let Some(component) = context.component_mut(id) {
                            component
                                .set_hash(entry.integrity.as_deref().and_then(Integrity::from_sri))
                                .set_license(license)
                                .set_source(entry.resolved.clone());
                        }
                        installed.push(Installed {
                            id,
                            dependencies: vec![&entry.requires],
                        });
                    }
                    Err(e) => {
                        context
                            .add_warning(format!("Skipping lock entry: {}", e))
                            .with_context("Package", name.as_str());
                    }
                }
            } else {
                context.add_warning(format!("Lock entry for {} has no version", name));
            }

            self.add_legacy_dependencies(context, &package_dir, &entry.dependencies, skip_dev, installed);
        }
    }
}

impl<R> Analyzer for NpmAnalyzer<R>
where
    R: NpmManifestReader + FileLookup,
{
    fn name(&self) -> &'static str {
        "npm"
    }

    fn options(&self) -> Vec<AnalyzerOption> {
        vec![
            AnalyzerOption::flag(DISABLE_NPM, "Disables the npm analyzer"),
            AnalyzerOption::flag(
                NO_DEV_DEPENDENCIES,
                "Excludes dev dependencies for npm projects",
            ),
        ]
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn before_analysis(&mut self, settings: &AnalysisSettings<'_>) {
        if settings.options.flag(DISABLE_NPM) {
            self.enabled = false;
        }
    }

    fn patterns(&self) -> &[&'static str] {
        &["**/package.json"]
    }

    fn should_traverse(&self, dir: &Path) -> bool {
        !has_segment(dir, NODE_MODULES)
    }

    fn can_handle(&self, _context: &AnalysisContext<'_>, path: &Path) -> bool {
        let name = file_name(path);
        name == PACKAGE_JSON || name == PACKAGE_LOCK
    }

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()> {
        let project_dir = path.parent().unwrap_or(context.root()).to_path_buf();
        let manifest_path = project_dir.join(PACKAGE_JSON);
        let lock_path = project_dir.join(PACKAGE_LOCK);
        let skip_dev = context.options().flag(NO_DEV_DEPENDENCIES);
        tracing::debug!("npm: analyzing {}", manifest_path.display());

        let Some(manifest) = self.read_manifest(context, &manifest_path) else {
            return Ok(());
        };

        let name = manifest.name.as_deref().unwrap_or_default();
        let version = manifest.version.as_deref().unwrap_or("0.0.0");
        let root = match Component::new(Ecosystem::Npm, name, version, ComponentKind::Root) {
            Ok(root) => context.add_component(root),
            Err(e) => {
                let shown = display_path(context, &manifest_path);
                context
                    .add_error(format!("Invalid package.json: {}", e))
                    .with_context("Path", shown);
                return Ok(());
            }
        };
        if let Some(component) = context.component_mut(root) {
            component.set_license(to_license(manifest.declared_license()));
        }

        let Some(lock) = self.read_lock(context, &lock_path) else {
            return Ok(());
        };

        let mut optional: HashSet<String> =
            manifest.optional_dependencies.keys().cloned().collect();
        let installed = match (&lock.packages, &lock.dependencies) {
            (Some(packages), _) => {
                optional.extend(
                    packages
                        .iter()
                        .filter(|(_, entry)| entry.optional)
                        .map(|(path, entry)| {
                            entry
                                .name
                                .clone()
                                .unwrap_or_else(|| package_name_from_path(path))
                        }),
                );
                self.add_packages(context, &project_dir, packages, skip_dev)
            }
            (None, Some(dependencies)) => {
                collect_optional_legacy(dependencies, &mut optional);
                let mut installed = Vec::new();
                self.add_legacy_dependencies(context, &project_dir, dependencies, skip_dev, &mut installed);
                installed
            }
            (None, None) => Vec::new(),
        };

        tracing::debug!(
            "npm: {} registered {} package(s)",
            lock_path.display(),
            installed.len()
        );

        // A partially read lockfile would produce misleading edges.
        if context.has_errors() {
            return Ok(());
        }

        // This lockfile's packages are matched before the rest of the graph.
        let own: HashSet<NodeId> = installed.iter().map(|package| package.id).collect();
        let linker = Linker {
            own: &own,
            optional: &optional,
        };

        linker.link(context, root, &manifest.dependencies);
        linker.link(context, root, &manifest.optional_dependencies);
        if !skip_dev {
            linker.link(context, root, &manifest.dev_dependencies);
        }

        for package in &installed {
            for dependencies in &package.dependencies {
                linker.link(context, package.id, dependencies);
            }
        }

        Ok(())
    }
}

/// Resolves declared dependencies for one lockfile
struct Linker<'a> {
    /// Packages registered from this lockfile
    own: &'a HashSet<NodeId>,
    optional: &'a HashSet<String>,
}

impl Linker<'_> {
    /// Connects `from` to the resolved component of every declared dependency.
    fn link(
        &self,
        context: &mut AnalysisContext<'_>,
        from: NodeId,
        dependencies: &IndexMap<String, String>,
    ) {
        for (name, spec) in dependencies {
            let range = NpmVersionRange::parse(spec);
            let resolution =
                ComponentResolver::resolve_npm_preferring(context.graph(), self.own, name, &range);
            let target = match resolution {
                Resolution::Exact(id) => id,
                Resolution::Fallback(id) => {
                    context.add_warning(format!(
                        "Could not find exact npm dependency match {} ({})",
                        name, spec
                    ));
                    id
                }
                Resolution::NotFound => {
                    if !self.optional.contains(name) {
                        context.add_warning(format!("Could not find npm dependency {} ({})", name, spec));
                    }
                    continue;
                }
            };

            if let Err(e) = context.connect(from, target, None) {
                context.add_warning(e.to_string());
            }
        }
    }
}

fn collect_optional_legacy(dependencies: &IndexMap<String, LockDependency>, optional: &mut HashSet<String>) {
    for (name, entry) in dependencies {
        if entry.optional {
            optional.insert(name.clone());
        }
        collect_optional_legacy(&entry.dependencies, optional);
    }
}

fn to_license(license: Option<&NpmLicense>) -> Option<BomLicense> {
    match license? {
        NpmLicense::Text(text) => LicensePriority::from_declaration(text),
        NpmLicense::Object { kind, url } => {
            LicensePriority::from_type_and_url(kind.as_deref(), url.as_deref())
        }
    }
}

fn is_installed_path(install_path: &str) -> bool {
    install_path.starts_with("node_modules/") || install_path.contains("/node_modules/")
}

/// `node_modules/a/node_modules/@scope/b` → `@scope/b`; other paths yield their last segment.
fn package_name_from_path(install_path: &str) -> String {
    match install_path.rsplit_once("node_modules/") {
        Some((_, name)) => name.to_string(),
        None => install_path
            .rsplit('/')
            .next()
            .unwrap_or(install_path)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::analyzers::test_support::{names, Workspace};
    use crate::sbom_generation::domain::{DiagnosticKind, HashAlgorithm};

    const MANIFEST: &str = r#"{
        "name": "app",
        "version": "1.0.0",
        "license": "MIT",
        "dependencies": { "leftpad": "^1.0.0" },
        "devDependencies": { "tester": "~2.0.0" }
    }"#;

    const LOCK_V3: &str = r#"{
        "name": "app",
        "version": "1.0.0",
        "lockfileVersion": 3,
        "packages": {
            "": { "name": "app", "version": "1.0.0" },
            "node_modules/leftpad": {
                "version": "1.0.5",
                "integrity": "sha512-AQKr",
                "license": "ISC",
                "dependencies": { "@scope/pad": "^0.1.0" }
            },
            "node_modules/@scope/pad": { "version": "0.1.2" },
            "node_modules/tester": { "version": "2.0.1", "dev": true }
        }
    }"#;

    #[test]
    fn test_package_name_from_path() {
        assert_eq!(package_name_from_path("node_modules/leftpad"), "leftpad");
        assert_eq!(
            package_name_from_path("node_modules/a/node_modules/@scope/b"),
            "@scope/b"
        );
        assert_eq!(package_name_from_path("packages/lib"), "lib");
    }

    #[test]
    fn test_lockfile_v3_components_and_edges() {
        let workspace = Workspace::new();
        workspace.write("package.json", MANIFEST);
        workspace.write("package-lock.json", LOCK_V3);

        let outcome = workspace.run(&NpmAnalyzer::new(workspace.reader()), "package.json");

        assert_eq!(
            names(&outcome),
            vec!["app", "leftpad", "@scope/pad", "tester"]
        );
        assert!(outcome.has_edge("app", "leftpad"));
        assert!(outcome.has_edge("app", "tester"));
        assert!(outcome.has_edge("leftpad", "@scope/pad"));
        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

        let leftpad = outcome.component("leftpad");
        assert_eq!(leftpad.hash().unwrap().algorithm, HashAlgorithm::Sha512);
        assert_eq!(leftpad.hash().unwrap().content, "0102AB");
        assert_eq!(leftpad.license().unwrap().id.as_deref(), Some("ISC"));
        assert!(outcome.component("app").is_root());
    }

    #[test]
    fn test_root_links_only_the_highest_satisfying_version() {
        let workspace = Workspace::new();
        workspace.write(
            "package.json",
            r#"{
                "name": "app",
                "version": "1.0.0",
                "dependencies": { "leftpad": "^1.2.0", "old": "^1.0.0" }
            }"#,
        );
        workspace.write(
            "package-lock.json",
            r#"{
                "lockfileVersion": 3,
                "packages": {
                    "": { "name": "app", "version": "1.0.0" },
                    "node_modules/leftpad": { "version": "1.5.0" },
                    "node_modules/old": {
                        "version": "1.0.0",
                        "dependencies": { "leftpad": "~1.2.0" }
                    },
                    "node_modules/old/node_modules/leftpad": { "version": "1.2.0" }
                }
            }"#,
        );

        let outcome = workspace.run(&NpmAnalyzer::new(workspace.reader()), "package.json");

        assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);
        assert_eq!(outcome.targets("app"), vec!["leftpad@1.5.0", "old@1.0.0"]);
        assert_eq!(outcome.targets("old"), vec!["leftpad@1.2.0"]);
    }

    #[test]
    fn test_no_dev_dependencies_flag() {
        let workspace = Workspace::new();
        workspace.write("package.json", MANIFEST);
        workspace.write("package-lock.json", LOCK_V3);

        let outcome = workspace.run_with_flags(
            &NpmAnalyzer::new(workspace.reader()),
            "package.json",
            &[NO_DEV_DEPENDENCIES],
        );

        assert_eq!(names(&outcome), vec!["app", "leftpad", "@scope/pad"]);
        assert!(!outcome.has_edge("app", "tester"));
    }

    #[test]
    fn test_lockfile_v1_requires() {
        let workspace = Workspace::new();
        workspace.write(
            "package.json",
            r#"{ "name": "legacy", "version": "0.1.0", "dependencies": { "a": "^1.0.0" } }"#,
        );
        workspace.write(
            "package-lock.json",
            r#"{
                "lockfileVersion": 1,
                "dependencies": {
                    "a": { "version": "1.1.0", "requires": { "b": "2.0.0" } },
                    "b": { "version": "2.0.0" }
                }
            }"#,
        );

        let outcome = workspace.run(&NpmAnalyzer::new(workspace.reader()), "package.json");

        assert!(outcome.has_edge("legacy", "a"));
        assert!(outcome.has_edge("a", "b"));
    }

    #[test]
    fn test_missing_lockfile_is_an_error() {
        let workspace = Workspace::new();
        workspace.write("package.json", MANIFEST);

        let outcome = workspace.run(&NpmAnalyzer::new(workspace.reader()), "package.json");

        assert_eq!(outcome.errors(), 1);
        assert_eq!(names(&outcome), vec!["app"]);
        assert_eq!(outcome.edges.len(), 0);
    }

    #[test]
    fn test_unresolved_dependency_warns_unless_optional() {
        let workspace = Workspace::new();
        workspace.write(
            "package.json",
            r#"{
                "name": "app",
                "version": "1.0.0",
                "dependencies": { "ghost": "^1.0.0" },
                "optionalDependencies": { "fsevents": "^2.0.0" }
            }"#,
        );
        workspace.write(
            "package-lock.json",
            r#"{ "lockfileVersion": 3, "packages": { "": {} } }"#,
        );

        let outcome = workspace.run(&NpmAnalyzer::new(workspace.reader()), "package.json");

        let warnings: Vec<_> = outcome
            .diagnostics
            .iter()
            .filter(|d| d.kind() == DiagnosticKind::Warning)
            .collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message().contains("ghost"));
    }

    #[test]
    fn test_disable_flag() {
        let workspace = Workspace::new();
        let mut analyzer = NpmAnalyzer::new(workspace.reader());
        let options = workspace.options(&[DISABLE_NPM]);
        analyzer.before_analysis(&AnalysisSettings::new(workspace.path(), &options));
        assert!(!analyzer.enabled());
    }

    #[test]
    fn test_should_traverse_prunes_node_modules() {
        let workspace = Workspace::new();
        let analyzer = NpmAnalyzer::new(workspace.reader());
        assert!(!analyzer.should_traverse(Path::new("web/node_modules")));
        assert!(analyzer.should_traverse(Path::new("web/src")));
    }
}
