/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (file system, console, CLI options, etc.).
pub mod file_globber;
pub mod file_lookup;
pub mod formatter;
pub mod manifests;
pub mod option_resolver;
pub mod output_presenter;
pub mod progress_reporter;

pub use file_globber::FileGlobber;
pub use file_lookup::FileLookup;
pub use formatter::BomFormatter;
pub use manifests::{CycloneDxReader, DotnetAssetReader, NpmManifestReader, PoetryManifestReader};
pub use option_resolver::{AnalyzerOption, OptionKind, OptionResolver};
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
