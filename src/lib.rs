//! bomgraph - one dependency graph across .NET, npm and Poetry projects
//!
//! This library discovers manifests below a project directory, lets one
//! analyzer per ecosystem turn them into components and dependency edges,
//! deduplicates everything into a single graph and hands the result over as
//! a [`Bom`](sbom_generation::domain::Bom).
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`sbom_generation`): Component graph, diagnostics, versions, range resolution
//! - **Application Layer** (`application`): Analysis context, analyzers and the analyze-project use case
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use bomgraph::prelude::*;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<()> {
//! let analyzers: Vec<Box<dyn Analyzer>> = vec![
//!     Box::new(NpmAnalyzer::new(FileSystemReader::new())),
//!     Box::new(DotnetAnalyzer::new(FileSystemReader::new())),
//! ];
//! let mut use_case =
//!     AnalyzeProjectUseCase::new(WalkDirGlobber::new(), StderrProgressReporter::new(), analyzers);
//!
//! let request = AnalysisRequest::new(Some(PathBuf::from(".")));
//! let response = use_case.execute(request, &NoOptions)?;
//!
//! println!("{}", JsonFormatter::new().format(&response.bom)?);
//! # Ok(())
//! # }
//! # struct NoOptions;
//! # impl OptionResolver for NoOptions {
//! #     fn flag(&self, _name: &str) -> bool { false }
//! #     fn value(&self, _name: &str) -> Option<String> { None }
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod ports;
pub mod sbom_generation;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::{DiagnosticRenderer, StderrProgressReporter};
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, FileSystemWriter, StdoutPresenter, WalkDirGlobber,
    };
    pub use crate::adapters::outbound::formatters::JsonFormatter;
    pub use crate::application::analysis_context::AnalysisContext;
    pub use crate::application::analyzers::{
        Analyzer, CycloneDxAnalyzer, DotnetAnalyzer, NpmAnalyzer, PoetryAnalyzer,
    };
    pub use crate::application::dto::{AnalysisRequest, AnalysisResponse, AnalysisSettings};
    pub use crate::application::use_cases::AnalyzeProjectUseCase;
    pub use crate::ports::inbound::AnalysisPort;
    pub use crate::ports::outbound::{
        AnalyzerOption, BomFormatter, FileGlobber, OptionResolver, OutputPresenter,
        ProgressReporter,
    };
    pub use crate::sbom_generation::domain::{
        Bom, BomDependency, BomRef, Component, ComponentGraph, ComponentKind, Diagnostic,
        DiagnosticContext, DiagnosticKind, Diagnostics, Ecosystem, NodeId, SCOPE_KEY,
    };
    pub use crate::sbom_generation::services::{ComponentResolver, Resolution};
    pub use crate::shared::Result;
}
