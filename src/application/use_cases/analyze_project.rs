use crate::application::analysis_context::AnalysisContext;
use crate::application::analyzers::Analyzer;
use crate::application::dto::{AnalysisRequest, AnalysisResponse, AnalysisSettings};
use crate::ports::inbound::AnalysisPort;
use crate::ports::outbound::{AnalyzerOption, FileGlobber, OptionResolver, ProgressReporter};
use crate::sbom_generation::domain::{
    Bom, BomDependency, BomMetadata, BomRef, Diagnostic, DiagnosticKind, NodeId,
};
use crate::sbom_generation::services::PathFilter;
use crate::shared::error::SbomError;
use crate::shared::Result;
use anyhow::Context;
use indexmap::{IndexMap, IndexSet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const DEFAULT_BOM_NAME: &str = "Unknown";
const DEFAULT_BOM_VERSION: &str = "0.0.0";

/// AnalyzeProjectUseCase - Drives every analyzer over a project tree
///
/// Discovers candidate files, offers each one to every active analyzer,
/// harvests what each analyzer added for that file, and assembles the
/// result into a [`Bom`].
///
/// # Type Parameters
/// * `G` - FileGlobber implementation
/// * `PR` - ProgressReporter implementation
pub struct AnalyzeProjectUseCase<G, PR> {
    globber: G,
    progress_reporter: PR,
    analyzers: Vec<Box<dyn Analyzer>>,
}

/// What the harvest step accumulates across files
#[derive(Default)]
struct Harvest {
    components: IndexMap<BomRef, NodeId>,
    dependencies: IndexMap<BomRef, IndexSet<BomRef>>,
    diagnostics: Vec<Diagnostic>,
}

impl<G, PR> AnalyzeProjectUseCase<G, PR>
where
    G: FileGlobber,
    PR: ProgressReporter,
{
    pub fn new(globber: G, progress_reporter: PR, analyzers: Vec<Box<dyn Analyzer>>) -> Self {
        Self {
            globber,
            progress_reporter,
            analyzers,
        }
    }

    /// Options contributed by all registered analyzers, in registration order.
    pub fn registered_options(&self) -> Vec<AnalyzerOption> {
        self.analyzers
            .iter()
            .flat_map(|analyzer| analyzer.options())
            .collect()
    }

    pub fn analyzer_names(&self) -> Vec<&'static str> {
        self.analyzers.iter().map(|analyzer| analyzer.name()).collect()
    }

    /// Executes the analysis
    ///
    /// # Returns
    /// The assembled BOM together with every diagnostic raised on the way
    ///
    /// # Errors
    /// Returns an error if the input path is invalid, discovery fails, or an
    /// analyzer reports an infrastructure failure
    pub fn execute(
        &mut self,
        request: AnalysisRequest,
        options: &dyn OptionResolver,
    ) -> Result<AnalysisResponse> {
        let (root, single_file) = resolve_input(request.input.as_deref())?;
        let filter = PathFilter::new(&request.exclude_paths)
            .map_err(|e| SbomError::InvalidArgument {
                message: format!("{:#}", e),
            })?;

        self.progress_reporter
            .report(&format!("🔎 Analyzing {}", root.display()));

        let settings = AnalysisSettings::new(&root, options);
        for analyzer in self.analyzers.iter_mut() {
            analyzer.before_analysis(&settings);
        }

        let active = self.active_analyzers(&request.disabled_analyzers);
        let candidates = match &single_file {
            Some(file) => vec![file.clone()],
            None => self.discover(&root, &active, &filter)?,
        };
        tracing::debug!(
            "{} candidate file(s) for {} analyzer(s)",
            candidates.len(),
            active.len()
        );

        let mut context = AnalysisContext::new(root.as_path(), options);
        let mut harvest = Harvest::default();
        let total = candidates.len();

        for (index, path) in candidates.iter().enumerate() {
            let shown = path.strip_prefix(&root).unwrap_or(path).display().to_string();
            self.progress_reporter
                .report_progress(index + 1, total, Some(&shown));

            for &position in &active {
                let analyzer = &self.analyzers[position];
                context.reset();
                if !analyzer.can_handle(&context, path) {
                    continue;
                }

                tracing::debug!("{}: {}", analyzer.name(), shown);
                analyzer
                    .analyze(&mut context, path)
                    .with_context(|| format!("The {} analyzer failed on {}", analyzer.name(), shown))?;

                harvest.collect(&mut context);
            }
        }

        for &position in &active {
            self.analyzers[position].after_analysis(&settings);
        }

        // Discovery never ran for a single file, so nothing could have matched.
        if single_file.is_none() {
            for pattern in filter.unmatched_patterns() {
                tracing::warn!("Exclude pattern '{}' did not match any path", pattern);
                let mut warning = Diagnostic::new(
                    DiagnosticKind::Warning,
                    format!("Exclude pattern '{}' did not match any path", pattern),
                );
                warning.with_context("Pattern", pattern);
                harvest.diagnostics.push(warning);
            }
        }

        let bom = assemble(&request, &root, &context, &harvest);
        self.progress_reporter.report_completion(&format!(
            "✅ Analyzed {} file(s): {} component(s), {} dependency record(s)",
            total,
            bom.components.len(),
            bom.dependencies.len()
        ));

        Ok(AnalysisResponse {
            bom,
            diagnostics: harvest.diagnostics,
            files_analyzed: total,
            root,
        })
    }

    /// Indexes of analyzers that are enabled and not switched off by configuration.
    fn active_analyzers(&self, disabled: &[String]) -> Vec<usize> {
        self.analyzers
            .iter()
            .enumerate()
            .filter(|(_, analyzer)| {
                let configured_off = disabled
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(analyzer.name()));
                if configured_off || !analyzer.enabled() {
                    tracing::debug!("Analyzer {} is disabled", analyzer.name());
                    return false;
                }
                true
            })
            .map(|(index, _)| index)
            .collect()
    }

    fn discover(&self, root: &Path, active: &[usize], filter: &PathFilter) -> Result<Vec<PathBuf>> {
        let patterns: Vec<&str> = active
            .iter()
            .flat_map(|&position| self.analyzers[position].patterns().iter().copied())
            .collect();
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let traverse = |dir: &Path| {
            !filter.is_excluded(dir)
                && active
                    .iter()
                    .all(|&position| self.analyzers[position].should_traverse(dir))
        };
        let found = self.globber.glob(root, &patterns, &traverse)?;

        let unique: BTreeSet<PathBuf> = found
            .into_iter()
            .filter(|path| {
                let relative = path.strip_prefix(root).unwrap_or(path);
                !relative.ancestors().any(|ancestor| filter.is_excluded(ancestor))
            })
            .collect();
        Ok(unique.into_iter().collect())
    }
}

impl<G, PR> AnalysisPort for AnalyzeProjectUseCase<G, PR>
where
    G: FileGlobber,
    PR: ProgressReporter,
{
    fn options(&self) -> Vec<AnalyzerOption> {
        self.registered_options()
    }

    fn analyze(
        &mut self,
        request: AnalysisRequest,
        options: &dyn OptionResolver,
    ) -> Result<AnalysisResponse> {
        self.execute(request, options)
    }
}

impl Harvest {
    /// Moves what the last `analyze` call produced out of the context.
    fn collect(&mut self, context: &mut AnalysisContext<'_>) {
        let delta = context.delta();
        for node in delta.nodes() {
            let Some(component) = context.component(node) else {
                continue;
            };
            self.components
                .entry(component.bom_ref().clone())
                .or_insert(node);

            let outgoing = delta.outgoing(node);
            if outgoing.is_empty() {
                continue;
            }
            let targets = self
                .dependencies
                .entry(component.bom_ref().clone())
                .or_default();
            for end in outgoing {
                if let Some(target) = context.component(end) {
                    targets.insert(target.bom_ref().clone());
                }
            }
        }

        self.diagnostics.extend(context.take_diagnostics());
    }
}

/// Splits the input into the analysis root and, for file input, the file itself.
fn resolve_input(input: Option<&Path>) -> Result<(PathBuf, Option<PathBuf>)> {
    let Some(input) = input else {
        let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
        return Ok((cwd, None));
    };

    if !input.exists() {
        return Err(SbomError::InvalidProjectPath {
            path: input.to_path_buf(),
            reason: "Path does not exist".to_string(),
        }
        .into());
    }

    let canonical = input
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", input.display()))?;
    if canonical.is_dir() {
        return Ok((canonical, None));
    }

    let root = canonical
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| SbomError::InvalidProjectPath {
            path: input.to_path_buf(),
            reason: "File has no parent directory".to_string(),
        })?;
    Ok((root, Some(canonical)))
}

fn assemble(request: &AnalysisRequest, root: &Path, context: &AnalysisContext<'_>, harvest: &Harvest) -> Bom {
    let name = request
        .name
        .clone()
        .or_else(|| {
            root.file_name()
                .map(|name| name.to_string_lossy().to_string())
        })
        .unwrap_or_else(|| DEFAULT_BOM_NAME.to_string());
    let version = request
        .version
        .clone()
        .unwrap_or_else(|| DEFAULT_BOM_VERSION.to_string());

    let mut bom = Bom::new(name, version);
    bom.metadata = request
        .metadata
        .iter()
        .map(|(key, value)| BomMetadata::new(key, value))
        .collect();

    let mut included: IndexMap<BomRef, NodeId> = harvest.components.clone();
    // Every dependency endpoint must be present as a component.
    for (from, targets) in &harvest.dependencies {
        for bom_ref in std::iter::once(from).chain(targets.iter()) {
            if included.contains_key(bom_ref) {
                continue;
            }
            match context.find(bom_ref) {
                Some(id) => {
                    included.insert(bom_ref.clone(), id);
                }
                None => tracing::warn!("Dependency {} has no component", bom_ref),
            }
        }
    }

    bom.components = included
        .values()
        .filter_map(|&id| context.component(id).cloned())
        .collect();
    bom.dependencies = harvest
        .dependencies
        .iter()
        .map(|(from, targets)| BomDependency::new(from.clone(), targets.iter().cloned().collect()))
        .collect();
    bom.files = context.files().to_vec();
    bom
}
