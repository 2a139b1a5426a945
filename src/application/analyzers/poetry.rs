use super::{display_path, file_name, has_segment, Analyzer};
use crate::application::analysis_context::AnalysisContext;
use crate::application::dto::AnalysisSettings;
use crate::ports::outbound::manifests::poetry::{PoetryLock, PoetryLockFile, PyProjectToml};
use crate::ports::outbound::{AnalyzerOption, FileLookup, PoetryManifestReader};
use crate::sbom_generation::domain::{BomHash, Component, ComponentKind, Diagnostics, Ecosystem};
use crate::sbom_generation::policies::LicensePriority;
use crate::sbom_generation::services::Integrity;
use crate::shared::Result;
use std::path::Path;

const DISABLE_POETRY: &str = "disable-poetry";
const NO_POETRY_DEV_DEPENDENCIES: &str = "no-poetry-dev-dependencies";
const NO_POETRY_TEST_DEPENDENCIES: &str = "no-poetry-test-dependencies";

const PYPROJECT: &str = "pyproject.toml";
const POETRY_LOCK: &str = "poetry.lock";

/// Analyzer for Poetry projects.
///
/// Contributes the project and its locked packages; dependency edges between
/// them are not linked.
pub struct PoetryAnalyzer<R> {
    reader: R,
    enabled: bool,
}

impl<R> PoetryAnalyzer<R>
where
    R: PoetryManifestReader + FileLookup,
{
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            enabled: true,
        }
    }

    fn read_pyproject(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Option<PyProjectToml> {
        let shown = display_path(context, path);
        if !self.reader.is_file(path) {
            context
                .add_error("Could not read pyproject.toml")
                .with_context("Path", shown);
            return None;
        }

        match self.reader.read_pyproject(path) {
            Ok(pyproject) => Some(pyproject),
            Err(e) => {
                context
                    .add_error(format!("Could not parse pyproject.toml: {:#}", e))
                    .with_context("Path", shown);
                None
            }
        }
    }

    fn read_lock(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Option<PoetryLock> {
        let shown = display_path(context, path);
        if !self.reader.is_file(path) {
            context
                .add_error("Could not read poetry.lock")
                .with_context("Path", shown);
            return None;
        }

        match self.reader.read_poetry_lock(path) {
            Ok(lock) => Some(lock),
            Err(e) => {
                context
                    .add_error(format!("Could not parse poetry.lock: {:#}", e))
                    .with_context("Path", shown);
                None
            }
        }
    }
}

impl<R> Analyzer for PoetryAnalyzer<R>
where
    R: PoetryManifestReader + FileLookup,
{
    fn name(&self) -> &'static str {
        "poetry"
    }

    fn options(&self) -> Vec<AnalyzerOption> {
        vec![
            AnalyzerOption::flag(DISABLE_POETRY, "Disables the Poetry analyzer"),
            AnalyzerOption::flag(
                NO_POETRY_DEV_DEPENDENCIES,
                "Excludes dev dependencies for Poetry projects",
            ),
            AnalyzerOption::flag(
                NO_POETRY_TEST_DEPENDENCIES,
                "Excludes test dependencies for Poetry projects",
            ),
        ]
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn before_analysis(&mut self, settings: &AnalysisSettings<'_>) {
        if settings.options.flag(DISABLE_POETRY) {
            self.enabled = false;
        }
    }

    fn patterns(&self) -> &[&'static str] {
        &["**/pyproject.toml"]
    }

    fn should_traverse(&self, dir: &Path) -> bool {
        !has_segment(dir, ".venv") && !has_segment(dir, "__pycache__")
    }

    fn can_handle(&self, _context: &AnalysisContext<'_>, path: &Path) -> bool {
        let name = file_name(path);
        name == PYPROJECT || name == POETRY_LOCK
    }

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()> {
        let project_dir = path.parent().unwrap_or(context.root()).to_path_buf();
        let pyproject_path = project_dir.join(PYPROJECT);
        tracing::debug!("poetry: analyzing {}", pyproject_path.display());

        // Both files are read before anything is added to the graph.
        let Some(pyproject) = self.read_pyproject(context, &pyproject_path) else {
            return Ok(());
        };
        let Some(lock) = self.read_lock(context, &project_dir.join(POETRY_LOCK)) else {
            return Ok(());
        };

        let Some((name, version)) = pyproject.name_and_version() else {
            let shown = display_path(context, &pyproject_path);
            context
                .add_error("pyproject.toml does not declare a project name and version")
                .with_context("Path", shown);
            return Ok(());
        };

        let root = match Component::new(Ecosystem::Poetry, name, version, ComponentKind::Root) {
            Ok(component) => context.add_component(component),
            Err(e) => {
                context.add_error(format!("Invalid pyproject.toml: {}", e));
                return Ok(());
            }
        };
        let license = pyproject
            .tool
            .as_ref()
            .and_then(|tool| tool.poetry.as_ref())
            .and_then(|poetry| poetry.license.as_deref())
            .and_then(LicensePriority::from_declaration);
        if let Some(component) = context.component_mut(root) {
            component.set_license(license);
        }

        for flag in [NO_POETRY_DEV_DEPENDENCIES, NO_POETRY_TEST_DEPENDENCIES] {
            if context.options().flag(flag) {
                let shown = display_path(context, &pyproject_path);
                context
                    .add_info(format!(
                        "--{} has no effect: Poetry dependency groups are not linked",
                        flag
                    ))
                    .with_context("Path", shown);
            }
        }

        for package in &lock.packages {
            let (Some(name), Some(version)) = (package.name.as_deref(), package.version.as_deref()) else {
                context.add_warning("Skipping poetry.lock package without name or version");
                continue;
            };

            let component = match Component::new(Ecosystem::Poetry, name, version, ComponentKind::Library) {
                Ok(component) => component,
                Err(e) => {
                    context.add_warning(format!("Skipping poetry.lock package: {}", e));
                    continue;
                }
            };

            let id = context.add_component(component);
            let hash = package_hash(&package.files).or_else(|| {
                lock.metadata
                    .as_ref()
                    .and_then(|metadata| metadata.files.get(name))
                    .and_then(|files| package_hash(files))
            });
            if let Some(component) = context.component_mut(id) {
                component.set_hash(hash);
            }
        }

        Ok(())
    }
}

/// Hash of the wheel when one is locked, else of the first listed file.
fn package_hash(files: &[PoetryLockFile]) -> Option<BomHash> {
    let chosen = files
        .iter()
        .find(|f| f.file.ends_with(".whl"))
        .or_else(|| files.first())?;
    Integrity::from_prefixed_hex(&chosen.hash)
}
