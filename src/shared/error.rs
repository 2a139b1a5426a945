use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes.
///
/// CI pipelines use these to tell a broken run apart from one that merely
/// found problems in the analyzed manifests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// BOM written, no error diagnostics
    Success = 0,
    /// Analysis finished but reported at least one error diagnostic; no BOM is written
    AnalysisErrors = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (unreadable input, file I/O error, etc.)
    ApplicationError = 3,
    /// No analyzer contributed a single component
    EmptyBom = 4,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::AnalysisErrors => write!(f, "Analysis Errors (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
            ExitCode::EmptyBom => write!(f, "Empty BOM (4)"),
        }
    }
}

/// User-facing failures that abort a run.
///
/// Problems inside individual manifests are reported as diagnostics instead;
/// these variants cover the host environment and the invocation itself.
#[derive(Debug, Error)]
pub enum SbomError {
    #[error("Invalid input path: {path}\nReason: {reason}\n\n💡 Hint: Pass a project directory or a single manifest file")]
    InvalidProjectPath { path: PathBuf, reason: String },

    #[error("Manifest disappeared during analysis: {path}\n\n💡 Hint: {suggestion}")]
    ManifestNotFound { path: PathBuf, suggestion: String },

    #[error("Failed to parse {path}\nDetails: {details}")]
    ManifestParseError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid configuration file: {path}\nDetails: {details}\n\n💡 Hint: See bomgraph.config.yml in the README for the supported keys")]
    ConfigError { path: PathBuf, details: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

impl SbomError {
    /// Exit code the binary reports when this error ends the run.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            SbomError::InvalidArgument { .. } | SbomError::InvalidProjectPath { .. } => {
                ExitCode::InvalidArguments
            }
            _ => ExitCode::ApplicationError,
        }
    }
}
