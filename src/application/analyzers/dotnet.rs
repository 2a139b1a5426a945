use super::{display_path, file_name, has_segment, Analyzer};
use crate::application::analysis_context::AnalysisContext;
use crate::application::dto::AnalysisSettings;
use crate::ports::outbound::manifests::dotnet::{
    package_roots, split_library_key, AssetLibrary, LibraryType, NuspecLicense, NuspecMetadata,
    ProjectAssets, RestoreFramework, TargetLibrary,
};
use crate::ports::outbound::{AnalyzerOption, DotnetAssetReader, FileLookup};
use crate::sbom_generation::domain::{
    BomHash, BomLicense, BomRef, Component, ComponentKind, Diagnostics, Ecosystem, HashAlgorithm,
    NodeId,
};
use crate::sbom_generation::policies::LicensePriority;
use crate::sbom_generation::services::{ComponentResolver, Integrity, NuGetVersionRange, Resolution};
use crate::shared::security::is_contained_relative_path;
use crate::shared::Result;
use indexmap::IndexMap;
use std::path::{Component as PathPart, Path, PathBuf};

const DISABLE_DOTNET: &str = "disable-dotnet";

const ASSETS_FILE: &str = "project.assets.json";
const DEFAULT_PROJECT_VERSION: &str = "1.0.0";
const PROJECT_EXTENSIONS: [&str; 3] = [".csproj", ".fsproj", ".vbproj"];

/// A project whose restore output was read successfully
struct LoadedProject {
    root: NodeId,
    dir: PathBuf,
    assets: ProjectAssets,
}

/// Analyzer for .NET solutions and projects restored with NuGet
pub struct DotnetAnalyzer<R> {
    reader: R,
    enabled: bool,
}

impl<R> DotnetAnalyzer<R>
where
    R: DotnetAssetReader + FileLookup,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            enabled: true,
        }
    }

    /// Adds the project and every library of its restore output.
    ///
    /// # Returns
    /// The loaded project, or `None` when the assets are unusable
    fn add_project(
        &self,
        context: &mut AnalysisContext<'_>,
        project_path: &Path,
        group: Option<&str>,
    ) -> Option<LoadedProject> {
        let project_dir = project_path.parent().unwrap_or(context.root()).to_path_buf();
        let assets_path = project_dir.join("obj").join(ASSETS_FILE);
        let shown = display_path(context, &assets_path);

        if !self.reader.is_file(&assets_path) {
            context.add_error(format!("Could not find project.assets.json at {}", shown));
            return None;
        }

        let assets = match self.reader.read_assets(&assets_path) {
            Ok(assets) => assets,
            Err(e) => {
                context
                    .add_error(format!("Could not parse project.assets.json: {:#}", e))
                    .with_context("Path", shown);
                return None;
            }
        };

        let name = assets.project.restore.project_name.clone().unwrap_or_else(|| {
            project_path
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_default()
        });
        let version = assets
            .project
            .version
            .as_deref()
            .unwrap_or(DEFAULT_PROJECT_VERSION);

        let root = match Component::new(Ecosystem::NuGet, &name, version, ComponentKind::Root) {
            Ok(component) => context.add_component(component),
            Err(e) => {
                context
                    .add_error(format!("Invalid project: {}", e))
                    .with_context("Path", shown);
                return None;
            }
        };
        if let Some(component) = context.component_mut(root) {
            component.add_group(group);
        }

        self.add_libraries(context, &assets, group);
        Some(LoadedProject {
            root,
            dir: project_dir,
            assets,
        })
    }

    fn add_libraries(&self, context: &mut AnalysisContext<'_>, assets: &ProjectAssets, group: Option<&str>) {
        let has_packages = assets
            .libraries
            .values()
            .any(|library| library.library_type() == LibraryType::Package);
        let folders = if has_packages {
            self.existing_package_roots(context, assets)
        } else {
            Vec::new()
        };

        for (key, library) in &assets.libraries {
            let Some((name, version)) = split_library_key(key) else {
                context.add_warning(format!("Malformed library key '{}'", key));
                continue;
            };

            match library.library_type() {
                LibraryType::Project => {
                    match Component::new(Ecosystem::NuGet, name, version, ComponentKind::Root) {
                        Ok(component) => {
                            let id = context.add_component(component);
                            if let Some(component) = context.component_mut(id) {
                                component.add_group(group);
                            }
                        }
                        Err(e) => {
                            context.add_warning(format!("Skipping project reference: {}", e));
                        }
                    }
                }
                LibraryType::Package => self.add_package(context, name, version, library, &folders),
            }
        }
    }

    fn existing_package_roots(&self, context: &mut AnalysisContext<'_>, assets: &ProjectAssets) -> Vec<PathBuf> {
        let mut folders = Vec::new();
        for folder in package_roots(assets) {
            if self.reader.is_dir(&folder) {
                folders.push(folder);
            } else {
                context.add_warning(format!(
                    "The packages folder '{}' did not exist on disk",
                    folder.display()
                ));
            }
        }
        folders
    }

    fn add_package(
        &self,
        context: &mut AnalysisContext<'_>,
        name: &str,
        version: &str,
        library: &AssetLibrary,
        folders: &[PathBuf],
    ) {
        let component = match Component::new(Ecosystem::NuGet, name, version, ComponentKind::Library) {
            Ok(component) => component,
            Err(e) => {
                context.add_warning(format!("Skipping package: {}", e));
                return;
            }
        };
        let id = context.add_component(component);

        let mut hash = library
            .sha512
            .as_deref()
            .and_then(|digest| Integrity::from_base64(HashAlgorithm::Sha512, digest));
        let mut license = None;
        let mut copyright = None;

        if let Some((folder, nupkg)) = self.package_folder(context, library, folders) {
            if hash.is_none() {
                hash = self.package_hash(context, &nupkg);
            }
            if let Some(metadata) = self.read_nuspec(context, name, &folder) {
                license = self.nuspec_license(context, &metadata, &folder);
                copyright = metadata.copyright;
            }
        }

        if let Some(component) = context.component_mut(id) {
            component
                .set_hash(hash)
                .set_license(license)
                .set_copyright(copyright);
        }
    }

    /// Finds the extracted package folder and its `.nupkg` under the first packages root that has it.
    fn package_folder(
        &self,
        context: &mut AnalysisContext<'_>,
        library: &AssetLibrary,
        folders: &[PathBuf],
    ) -> Option<(PathBuf, PathBuf)> {
        let Some(relative) = library.path.as_deref() else {
            context.add_warning("Encountered library without a path");
            return None;
        };

        for root in folders {
            let folder = root.join(relative);
            if !self.reader.is_dir(&folder) {
                continue;
            }
            match self.reader.files_with_suffix(&folder, ".nupkg").into_iter().next() {
                Some(nupkg) => return Some((folder, nupkg)),
                None => {
                    context.add_warning(format!(
                        "The library folder '{}' did not contain a .nupkg",
                        folder.display()
                    ));
                }
            }
        }

        None
    }

    fn package_hash(&self, context: &mut AnalysisContext<'_>, nupkg: &Path) -> Option<BomHash> {
        match self.reader.sha512(nupkg) {
            Ok(hash) => Some(hash),
            Err(e) => {
                context.add_warning(format!("Could not hash {}: {:#}", nupkg.display(), e));
                None
            }
        }
    }

    fn read_nuspec(&self, context: &mut AnalysisContext<'_>, name: &str, folder: &Path) -> Option<NuspecMetadata> {
        let nuspec = folder.join(format!("{}.nuspec", name.to_ascii_lowercase()));
        if !self.reader.is_file(&nuspec) {
            context.add_warning(format!(
                "The library folder '{}' did not contain a NuSpec",
                folder.display()
            ));
            return None;
        }

        match self.reader.read_nuspec(&nuspec) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                context.add_error(format!(
                    "Could not parse the NuGet package information '{}': {:#}",
                    nuspec.display(),
                    e
                ));
                None
            }
        }
    }

    fn nuspec_license(
        &self,
        context: &mut AnalysisContext<'_>,
        metadata: &NuspecMetadata,
        folder: &Path,
    ) -> Option<BomLicense> {
        let license = match &metadata.license {
            Some(NuspecLicense::Expression(expression)) => LicensePriority::from_declaration(expression),
            Some(NuspecLicense::File(file)) if is_contained_relative_path(file) => {
                match self.reader.read_text(&folder.join(file)) {
                    Ok(text) => Some(BomLicense {
                        text: Some(text),
                        ..Default::default()
                    }),
                    Err(e) => {
                        context.add_warning(format!("Could not read license file '{}': {:#}", file, e));
                        None
                    }
                }
            }
            Some(NuspecLicense::File(file)) => {
                context.add_warning(format!("Ignoring license file outside the package: {}", file));
                None
            }
            None => None,
        };

        license.or_else(|| LicensePriority::from_type_and_url(None, metadata.license_url.as_deref()))
    }
}

impl<R> Analyzer for DotnetAnalyzer<R>
where
    R: DotnetAssetReader + FileLookup,
{
    fn name(&self) -> &'static str {
        "dotnet"
    }

    fn options(&self) -> Vec<AnalyzerOption> {
        vec![AnalyzerOption::flag(DISABLE_DOTNET, "Disables the .NET analyzer")]
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn before_analysis(&mut self, settings: &AnalysisSettings<'_>) {
        if settings.options.flag(DISABLE_DOTNET) {
            self.enabled = false;
        }
    }

    fn patterns(&self) -> &[&'static str] {
        &["**/*.sln", "**/*.csproj", "**/*.fsproj", "**/*.vbproj"]
    }

    fn should_traverse(&self, dir: &Path) -> bool {
        !has_segment(dir, "bin") && !has_segment(dir, "obj")
    }

    fn can_handle(&self, _context: &AnalysisContext<'_>, path: &Path) -> bool {
        is_solution(path) || is_project(path)
    }

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()> {
        tracing::debug!("dotnet: analyzing {}", path.display());

        if !is_solution(path) {
            if let Some(project) = self.add_project(context, path, None) {
                link_project(context, &project);
            }
            return Ok(());
        }

        let solution = match self.reader.read_solution(path) {
            Ok(solution) => solution,
            Err(e) => {
                let shown = display_path(context, path);
                context
                    .add_error(format!("Could not read solution: {:#}", e))
                    .with_context("Path", shown);
                return Ok(());
            }
        };

        let group = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
        let solution_dir = path.parent().unwrap_or(context.root()).to_path_buf();

        // Every project is added before any edge, so project references resolve.
        let mut loaded = Vec::new();
        for project in &solution.projects {
            let project_path = solution_dir.join(project.relative_path.replace('\\', "/"));
            if !is_project(&project_path) {
                continue;
            }
            if let Some(added) = self.add_project(context, &project_path, group.as_deref()) {
                loaded.push(added);
            }
        }

        for project in &loaded {
            link_project(context, project);
        }

        Ok(())
    }
}

fn link_project(context: &mut AnalysisContext<'_>, project: &LoadedProject) {
    let assets = &project.assets;
    for (framework, references) in &assets.project.frameworks {
        let mut scoped = context.scope(framework.as_str());
        for (name, reference) in &references.dependencies {
            let range = reference.version.as_deref().unwrap_or_default();
            connect_dependency(&mut scoped, project.root, name, range, framework);
        }
    }

    for (framework, restore) in &assets.project.restore.frameworks {
        let mut scoped = context.scope(framework.as_str());
        link_project_references(&mut scoped, project, framework, restore);
    }

    for (target, libraries) in &assets.targets {
        let mut scoped = context.scope(target.as_str());
        if !link_target(&mut scoped, target, libraries) {
            return;
        }
    }
}

/// Links every library of one target; `false` when a library is missing from the graph.
fn link_target(
    context: &mut AnalysisContext<'_>,
    target: &str,
    libraries: &IndexMap<String, TargetLibrary>,
) -> bool {
    for (key, library) in libraries {
        let Some((name, version)) = split_library_key(key) else {
            context.add_warning(format!("Malformed library key '{}'", key));
            continue;
        };

        let kind = match library.library_type() {
            LibraryType::Project => ComponentKind::Root,
            LibraryType::Package => ComponentKind::Library,
        };
        let bom_ref = BomRef::synthesize(Ecosystem::NuGet, kind, name, version);
        let Some(from) = context.find(&bom_ref) else {
            context.add_error(format!("Could not find library '{}' in graph", name));
            return false;
        };

        for (dependency, range) in &library.dependencies {
            connect_dependency(context, from, dependency, range, target);
        }
    }

    true
}

/// Connects the project to every project it references for one framework.
fn link_project_references(
    context: &mut AnalysisContext<'_>,
    project: &LoadedProject,
    framework: &str,
    restore: &RestoreFramework,
) {
    for (key, reference) in &restore.project_references {
        let reference_path = reference.project_path.as_deref().unwrap_or(key);
        let Some((name, version)) = referenced_project(&project.assets, &project.dir, reference_path)
        else {
            context.add_warning(format!(
                "Could not find project reference '{}' in the restore output",
                reference_path
            ));
            continue;
        };

        let bom_ref = BomRef::synthesize(Ecosystem::NuGet, ComponentKind::Root, name, version);
        let Some(to) = context.find(&bom_ref) else {
            context.add_warning(format!("Could not find project '{}' in graph", name));
            continue;
        };
        if let Err(e) = context.connect(project.root, to, Some(framework)) {
            context.add_warning(e.to_string());
        }
    }
}

/// Maps a referenced project file to the `Name/Version` of its project library.
///
/// Library paths are relative to the referencing project. When no path matches
/// (e.g. the assets were restored on another machine) the file name decides.
fn referenced_project<'a>(
    assets: &'a ProjectAssets,
    project_dir: &Path,
    reference_path: &str,
) -> Option<(&'a str, &'a str)> {
    let wanted = normalize_path(&project_dir.join(reference_path.replace('\\', "/")));
    let wanted_file = wanted.rsplit('/').next().unwrap_or_default().to_string();

    let projects: Vec<(&str, &str, String)> = assets
        .libraries
        .iter()
        .filter(|(_, library)| library.library_type() == LibraryType::Project)
        .filter_map(|(key, library)| {
            let (name, version) = split_library_key(key)?;
            let path = library.path.as_deref()?;
            Some((name, version, normalize_path(&project_dir.join(path.replace('\\', "/")))))
        })
        .collect();

    projects
        .iter()
        .find(|(_, _, path)| *path == wanted)
        .or_else(|| {
            projects
                .iter()
                .find(|(_, _, path)| path.rsplit('/').next() == Some(wanted_file.as_str()))
        })
        .map(|(name, version, _)| (*name, *version))
}

/// Lexically resolves `.` and `..`, lowercased with `/` separators.
fn normalize_path(path: &Path) -> String {
    let mut parts: Vec<String> = Vec::new();
    for part in path.components() {
        match part {
            PathPart::CurDir => {}
            PathPart::ParentDir => {
                parts.pop();
            }
            other => parts.push(other.as_os_str().to_string_lossy().to_ascii_lowercase()),
        }
    }
    parts.join("/")
}

fn connect_dependency(
    context: &mut AnalysisContext<'_>,
    from: NodeId,
    dependency: &str,
    range: &str,
    target: &str,
) {
    let parsed = NuGetVersionRange::parse(range);
    let to = match ComponentResolver::resolve_nuget(context.graph(), dependency, parsed.as_ref()) {
        Resolution::Exact(id) => id,
        Resolution::Fallback(id) => {
            context.add_warning(format!(
                "Could not find exact NuGet dependency match {} ({})",
                dependency, range
            ));
            id
        }
        Resolution::NotFound => {
            context.add_warning(format!("Could not find NuGet dependency {} ({})", dependency, range));
            return;
        }
    };

    if let Err(e) = context.connect(from, to, Some(target)) {
        context.add_warning(e.to_string());
    }
}

fn is_solution(path: &Path) -> bool {
    file_name(path).ends_with(".sln")
}

fn is_project(path: &Path) -> bool {
    let name = file_name(path);
    PROJECT_EXTENSIONS.iter().any(|extension| name.ends_with(extension))
}
