use std::path::PathBuf;

/// AnalysisRequest - Input of the analyze-project use case
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    /// Directory or single manifest to analyze; the working directory when absent
    pub input: Option<PathBuf>,
    /// BOM name; derived from the input path when absent
    pub name: Option<String>,
    /// BOM version; `0.0.0` when absent
    pub version: Option<String>,
    /// Extra key/value pairs copied into the BOM metadata
    pub metadata: Vec<(String, String)>,
    /// Root-relative glob patterns of directories and files to skip
    pub exclude_paths: Vec<String>,
    /// Analyzer names switched off by configuration
    pub disabled_analyzers: Vec<String>,
}

impl AnalysisRequest {
    pub fn new(input: Option<PathBuf>) -> Self {
        Self {
            input,
            ..Default::default()
        }
    }
}
