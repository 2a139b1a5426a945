use crate::shared::Result;
use std::path::{Path, PathBuf};

/// FileGlobber port for candidate file discovery
pub trait FileGlobber {
    /// Returns files below `root` whose root-relative path matches any of
    /// `patterns`, without descending into directories rejected by `traverse`.
    /// `traverse` receives root-relative directory paths; the root itself is
    /// always entered.
    ///
    /// The result is sorted and free of duplicates.
    ///
    /// # Errors
    /// Returns an error if a pattern is invalid or `root` cannot be read
    fn glob(
        &self,
        root: &Path,
        patterns: &[&str],
        traverse: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<PathBuf>>;
}
