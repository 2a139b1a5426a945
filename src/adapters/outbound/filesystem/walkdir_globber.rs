use crate::ports::outbound::FileGlobber;
use crate::shared::error::SbomError;
use crate::shared::Result;
use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// WalkDirGlobber adapter that walks the project tree once per run
///
/// Symlinks are not followed. Unreadable subdirectories are skipped with a
/// debug log so one permission problem does not abort the whole analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkDirGlobber;

impl WalkDirGlobber {
    pub fn new() -> Self {
        Self
    }
}

impl FileGlobber for WalkDirGlobber {
    fn glob(
        &self,
        root: &Path,
        patterns: &[&str],
        traverse: &dyn Fn(&Path) -> bool,
    ) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(SbomError::FileReadError {
                path: root.to_path_buf(),
                details: "not a directory".to_string(),
            }
            .into());
        }

        let matchers = patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern)
                    .map_err(|e| anyhow::anyhow!("Invalid file pattern '{}': {}", pattern, e))
            })
            .collect::<Result<Vec<_>>>()?;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                match entry.path().strip_prefix(root) {
                    Ok(relative) => traverse(relative),
                    Err(_) => false,
                }
            });

        let mut found = BTreeSet::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };
            let normalized = relative.to_string_lossy().replace('\\', "/");
            if matchers
                .iter()
                .any(|m| m.matches_with(&normalized, MATCH_OPTIONS))
            {
                found.insert(entry.into_path());
            }
        }

        Ok(found.into_iter().collect())
    }
}
