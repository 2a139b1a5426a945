/// Console adapters for progress and diagnostic output on stderr
mod diagnostic_renderer;
mod progress_reporter;

pub use diagnostic_renderer::DiagnosticRenderer;
pub use progress_reporter::StderrProgressReporter;
