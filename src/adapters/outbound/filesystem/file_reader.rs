use super::nuspec_parser::parse_nuspec;
use super::solution_parser::parse_solution;
use crate::ports::outbound::manifests::cyclonedx::CycloneDxDocument;
use crate::ports::outbound::manifests::dotnet::{NuspecMetadata, ProjectAssets, SolutionFile};
use crate::ports::outbound::manifests::npm::{PackageJson, PackageLockJson};
use crate::ports::outbound::manifests::poetry::{PoetryLock, PyProjectToml};
use crate::ports::outbound::{
    CycloneDxReader, DotnetAssetReader, FileLookup, NpmManifestReader, PoetryManifestReader,
};
use crate::sbom_generation::domain::{BomHash, HashAlgorithm};
use crate::shared::error::SbomError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_FILE_SIZE};
use crate::shared::Result;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha512};
use std::fs;
use std::path::{Path, PathBuf};

/// FileSystemReader adapter for reading manifests from the file system
///
/// This adapter implements every manifest reader port plus [`FileLookup`].
/// All reads go through the same symlink and size checks.
#[derive(Debug, Clone, Copy)]
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemReader {
    /// Safely read a file with security checks:
    /// - Reject symbolic links
    /// - Check file size limits
    /// - Validate file is a regular file
    fn safe_read_file(&self, path: &Path, file_type: &str) -> Result<String> {
        let file_size = validate_regular_file(path, file_type)?;
        validate_file_size(file_size, path, MAX_FILE_SIZE)?;

        fs::read_to_string(path).map_err(|e| {
            SbomError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into()
        })
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path, file_type: &str) -> Result<T> {
        let content = self.safe_read_file(path, file_type)?;
        serde_json::from_str(&content).map_err(|e| {
            SbomError::ManifestParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into()
        })
    }

    fn read_toml<T: DeserializeOwned>(&self, path: &Path, file_type: &str) -> Result<T> {
        let content = self.safe_read_file(path, file_type)?;
        toml::from_str(&content).map_err(|e| {
            SbomError::ManifestParseError {
                path: path.to_path_buf(),
                details: e.to_string(),
            }
            .into()
        })
    }
}

impl FileLookup for FileSystemReader {
    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn files_with_suffix(&self, dir: &Path, suffix: &str) -> Vec<PathBuf> {
        let suffix = suffix.to_ascii_lowercase();
        let Ok(entries) = fs::read_dir(dir) else {
            return Vec::new();
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().to_ascii_lowercase().ends_with(&suffix))
                    .unwrap_or(false)
            })
            .collect();
        files.sort();
        files
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        self.safe_read_file(path, "text file")
    }

    fn sha512(&self, path: &Path) -> Result<BomHash> {
        let file_size = validate_regular_file(path, "package archive")?;
        validate_file_size(file_size, path, MAX_FILE_SIZE)?;

        let bytes = fs::read(path).map_err(|e| SbomError::FileReadError {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        let digest = Sha512::digest(&bytes);
        Ok(BomHash::new(HashAlgorithm::Sha512, hex::encode_upper(digest)))
    }
}

impl NpmManifestReader for FileSystemReader {
    fn read_package_json(&self, path: &Path) -> Result<PackageJson> {
        self.read_json(path, "package.json")
    }

    fn read_package_lock(&self, path: &Path) -> Result<PackageLockJson> {
        self.read_json(path, "package-lock.json")
    }
}

impl DotnetAssetReader for FileSystemReader {
    fn read_solution(&self, path: &Path) -> Result<SolutionFile> {
        let content = self.safe_read_file(path, "solution file")?;
        parse_solution(&content)
    }

    fn read_assets(&self, path: &Path) -> Result<ProjectAssets> {
        self.read_json(path, "project.assets.json")
    }

    fn read_nuspec(&self, path: &Path) -> Result<NuspecMetadata> {
        let content = self.safe_read_file(path, "nuspec")?;
        parse_nuspec(&content).map_err(|e| {
            SbomError::ManifestParseError {
                path: path.to_path_buf(),
                details: format!("{:#}", e),
            }
            .into()
        })
    }
}

impl PoetryManifestReader for FileSystemReader {
    fn read_pyproject(&self, path: &Path) -> Result<PyProjectToml> {
        self.read_toml(path, "pyproject.toml")
    }

    fn read_poetry_lock(&self, path: &Path) -> Result<PoetryLock> {
        self.read_toml(path, "poetry.lock")
    }
}

impl CycloneDxReader for FileSystemReader {
    fn read_bom(&self, path: &Path) -> Result<CycloneDxDocument> {
        self.read_json(path, "CycloneDX document")
    }
}
