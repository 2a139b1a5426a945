//! Ecosystem analyzers
//!
//! Each analyzer turns one kind of manifest into components and edges on the
//! [`AnalysisContext`]. The engine drives them through the [`Analyzer`] trait.
mod cyclonedx;
mod dotnet;
mod npm;
mod poetry;
#[cfg(test)]
mod test_support;

pub use cyclonedx::CycloneDxAnalyzer;
pub use dotnet::DotnetAnalyzer;
pub use npm::NpmAnalyzer;
pub use poetry::PoetryAnalyzer;

use crate::application::analysis_context::AnalysisContext;
use crate::application::dto::AnalysisSettings;
use crate::ports::outbound::AnalyzerOption;
use crate::shared::Result;
use std::path::Path;

/// Contract between the engine and an ecosystem analyzer.
///
/// `analyze` reports bad input data as diagnostics on the context and
/// returns `Err` only when the host environment is broken; an `Err` ends
/// the whole run.
pub trait Analyzer {
    /// Short identifier used in logs and in `disabled_analyzers`
    fn name(&self) -> &'static str;

    /// Options this analyzer adds to the command line.
    fn options(&self) -> Vec<AnalyzerOption> {
        Vec::new()
    }

    fn enabled(&self) -> bool {
        true
    }

    /// Reads run-wide settings; the place to honor `--disable-*` flags.
    fn before_analysis(&mut self, _settings: &AnalysisSettings<'_>) {}

    /// Root-relative glob patterns of candidate files
    fn patterns(&self) -> &[&'static str];

    /// Whether discovery may descend into `dir`.
    fn should_traverse(&self, _dir: &Path) -> bool {
        true
    }

    fn can_handle(&self, context: &AnalysisContext<'_>, path: &Path) -> bool;

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()>;

    fn after_analysis(&mut self, _settings: &AnalysisSettings<'_>) {}
}

/// Lowercased final path component.
fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

/// True when any component of `dir` equals `segment`.
fn has_segment(dir: &Path, segment: &str) -> bool {
    dir.components()
        .any(|component| component.as_os_str() == segment)
}

/// Path shown in diagnostics: relative to the analysis root when possible.
fn display_path(context: &AnalysisContext<'_>, path: &Path) -> String {
    path.strip_prefix(context.root())
        .unwrap_or(path)
        .display()
        .to_string()
}
