/// Result alias used throughout the crate; failures propagate as `anyhow::Error`.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
