/// Application layer - Use cases, analyzers and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod analysis_context;
pub mod analyzers;
pub mod dto;
pub mod use_cases;
