use crate::application::dto::{AnalysisRequest, AnalysisResponse};
use crate::ports::outbound::{AnalyzerOption, OptionResolver};
use crate::shared::Result;

/// AnalysisPort - Inbound port for the analyze-project use case
///
/// The CLI drives the application through this port in two passes: first it
/// collects [`AnalysisPort::options`] to extend the command line, then it
/// runs [`AnalysisPort::analyze`] with the parsed values.
pub trait AnalysisPort {
    /// Options every registered analyzer contributes to the command line
    fn options(&self) -> Vec<AnalyzerOption>;

    /// Analyzes the project described by `request`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The input path does not exist
    /// - An exclude pattern is invalid
    /// - An analyzer hits an infrastructure failure
    fn analyze(
        &mut self,
        request: AnalysisRequest,
        options: &dyn OptionResolver,
    ) -> Result<AnalysisResponse>;
}
