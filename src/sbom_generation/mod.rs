/// Domain layer: component graph, diagnostics, versions and the pure services built on them
pub mod domain;
pub mod policies;
pub mod services;
