use crate::sbom_generation::domain::BomHash;
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// FileLookup port for the plain filesystem questions analyzers ask
///
/// Manifest parsing lives in the ecosystem-specific reader ports; this port
/// covers existence checks, directory listings, free text and file hashing.
pub trait FileLookup {
    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Files directly inside `dir` whose name ends with `suffix` (case-insensitive), sorted.
    fn files_with_suffix(&self, dir: &Path, suffix: &str) -> Vec<PathBuf>;

    /// Reads a UTF-8 file (license texts and similar).
    fn read_text(&self, path: &Path) -> Result<String>;

    /// SHA-512 of the file's contents.
    ///
    /// # Errors
    /// Returns an error if the file is missing, is a symlink or is too large
    fn sha512(&self, path: &Path) -> Result<BomHash>;
}
