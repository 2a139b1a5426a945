use crate::shared::Result;

/// OutputPresenter port for delivering the formatted BOM
pub trait OutputPresenter {
    /// Writes `content` to the destination.
    ///
    /// # Errors
    /// Returns an error if the destination cannot be written
    fn present(&self, content: &str) -> Result<()>;
}
