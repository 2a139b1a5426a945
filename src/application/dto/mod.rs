/// Data Transfer Objects for application layer
///
/// DTOs carry data between the CLI adapter and the use case, keeping the
/// domain layer free of invocation details.
mod analysis_request;
mod analysis_response;
mod analysis_settings;

pub use analysis_request::AnalysisRequest;
pub use analysis_response::AnalysisResponse;
pub use analysis_settings::AnalysisSettings;
