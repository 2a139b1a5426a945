/// Mock implementations for testing
mod mock_analyzer;
mod mock_option_resolver;
mod mock_progress_reporter;

pub use mock_analyzer::MockAnalyzer;
pub use mock_option_resolver::MockOptionResolver;
pub use mock_progress_reporter::{MockProgressReporter, ProgressEvent};
