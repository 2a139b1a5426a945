pub mod bom;
pub mod component;
pub mod diagnostic;
pub mod graph;
pub mod version;

pub use bom::{Bom, BomDependency, BomFile, BomMetadata};
pub use component::{
    BomHash, BomLicense, BomRef, Component, ComponentKind, Ecosystem, HashAlgorithm,
};
pub use diagnostic::{
    Diagnostic, DiagnosticContext, DiagnosticKind, Diagnostics, ScopeGuard, SCOPE_KEY,
};
pub use graph::{ComponentGraph, GraphEdge, GraphError, GraphNode, NodeId};
pub use version::{ComponentVersion, SemanticVersion};
