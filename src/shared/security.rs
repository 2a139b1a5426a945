use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fs;
use std::path::{Component, Path};

/// Largest manifest, lockfile or package archive that will be read (100 MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Checks that `path` is a regular file and not a symlink, returning its size.
///
/// `symlink_metadata` is used so the link itself is inspected, not its target.
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<u64> {
    let metadata = fs::symlink_metadata(path).map_err(|e| SbomError::FileReadError {
        path: path.to_path_buf(),
        details: format!("cannot stat {}: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} is a symbolic link", file_description),
            hint: "Replace the link with the file it points to".to_string(),
        }
        .into());
    }
    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(metadata.len())
}

/// Rejects files larger than `max_size` bytes.
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        return Err(SbomError::SecurityError {
            path: path.to_path_buf(),
            reason: format!(
                "file is too large ({} bytes, limit {} bytes)",
                file_size, max_size
            ),
            hint: "Exclude the directory with exclude_paths in bomgraph.config.yml".to_string(),
        }
        .into());
    }
    Ok(())
}

/// Returns true when a relative path taken from a manifest stays below its base
/// directory (no `..` escaping it, no absolute components).
pub fn is_contained_relative_path(relative: &str) -> bool {
    let mut depth: usize = 0;
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => match depth.checked_sub(1) {
                Some(value) => depth = value,
                None => return false,
            },
            Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_validate_regular_file_returns_size() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("package.json");
        fs::write(&file_path, "{}").unwrap();

        assert_eq!(validate_regular_file(&file_path, "package.json").unwrap(), 2);
    }

    #[test]
    fn test_validate_regular_file_nonexistent() {
        let path = PathBuf::from("/nonexistent/package.json");
        assert!(validate_regular_file(&path, "package.json").is_err());
    }

    #[test]
    fn test_validate_regular_file_is_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = validate_regular_file(temp_dir.path(), "directory");
        assert!(result.unwrap_err().to_string().contains("not a regular file"));
    }

    #[cfg(unix)]
    #[test]
    fn test_validate_regular_file_rejects_symlink() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("real.json");
        let link = temp_dir.path().join("link.json");
        fs::write(&target, "{}").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let error = validate_regular_file(&link, "link.json").unwrap_err();
        assert!(error.to_string().contains("Security violation"));
    }

    #[test]
    fn test_validate_file_size() {
        let path = PathBuf::from("/test/package-lock.json");
        assert!(validate_file_size(1000, &path, MAX_FILE_SIZE).is_ok());

        let error = validate_file_size(MAX_FILE_SIZE + 1, &path, MAX_FILE_SIZE).unwrap_err();
        assert!(error.to_string().contains("too large"));
    }

    #[test]
    fn test_is_contained_relative_path() {
        assert!(is_contained_relative_path("src/App/App.csproj"));
        assert!(is_contained_relative_path("./a/../b.json"));
        assert!(!is_contained_relative_path("../outside.csproj"));
        assert!(!is_contained_relative_path("a/../../outside"));
        assert!(!is_contained_relative_path("/etc/passwd"));
    }
}
