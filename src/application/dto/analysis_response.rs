use crate::sbom_generation::domain::{Bom, Diagnostic};
use std::path::PathBuf;

/// AnalysisResponse - Result of the analyze-project use case
///
/// The use case never decides whether the run failed; callers inspect
/// `diagnostics` for errors before emitting the BOM.
#[derive(Debug, Clone)]
pub struct AnalysisResponse {
    pub bom: Bom,
    pub diagnostics: Vec<Diagnostic>,
    /// Number of candidate files that were offered to the analyzers
    pub files_analyzed: usize,
    /// Canonical directory the run was rooted at
    pub root: PathBuf,
}

impl AnalysisResponse {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}
