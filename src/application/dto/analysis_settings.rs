use crate::ports::outbound::OptionResolver;
use std::path::Path;

/// Run-wide values handed to analyzers before and after the file loop
pub struct AnalysisSettings<'a> {
    pub root: &'a Path,
    pub options: &'a dyn OptionResolver,
}

impl<'a> AnalysisSettings<'a> {
    pub fn new(root: &'a Path, options: &'a dyn OptionResolver) -> Self {
        Self { root, options }
    }
}
