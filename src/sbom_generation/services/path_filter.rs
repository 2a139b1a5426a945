use crate::shared::Result;
use glob::Pattern;
use std::cell::Cell;
use std::path::Path;

/// Maximum number of exclude patterns to prevent DoS attacks
const MAX_EXCLUDE_PATTERNS: usize = 64;

/// Maximum length of a single exclude pattern
const MAX_PATTERN_LENGTH: usize = 255;

/// PathFilter - Skips files and directories matching exclusion globs
///
/// Patterns are matched against root-relative paths using `/` as the
/// separator, so `vendor`, `vendor/**` and `**/fixtures` all work the same
/// way on every platform.
#[derive(Debug, Default)]
pub struct PathFilter {
    patterns: Vec<ExcludePattern>,
}

impl PathFilter {
    /// Creates a new PathFilter from raw pattern strings
    ///
    /// # Errors
    /// - Too many patterns (> MAX_EXCLUDE_PATTERNS)
    /// - Empty, overlong or syntactically invalid patterns
    pub fn new(patterns: &[String]) -> Result<Self> {
        if patterns.len() > MAX_EXCLUDE_PATTERNS {
            anyhow::bail!(
                "Too many exclusion patterns: {} (maximum: {})",
                patterns.len(),
                MAX_EXCLUDE_PATTERNS
            );
        }

        let patterns = patterns
            .iter()
            .map(|pattern| ExcludePattern::new(pattern))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Checks a root-relative path against every pattern.
    pub fn is_excluded(&self, relative: &Path) -> bool {
        let normalized = relative.to_string_lossy().replace('\\', "/");
        if normalized.is_empty() {
            return false;
        }
        // Every pattern is evaluated so unmatched reporting stays accurate.
        self.patterns
            .iter()
            .fold(false, |excluded, p| p.matches(&normalized) || excluded)
    }

    /// Patterns that never excluded anything, in declaration order.
    pub fn unmatched_patterns(&self) -> Vec<String> {
        self.patterns
            .iter()
            .filter(|p| !p.matched.get())
            .map(|p| p.original.clone())
            .collect()
    }
}

#[derive(Debug)]
struct ExcludePattern {
    original: String,
    matcher: Pattern,
    matched: Cell<bool>,
}

impl ExcludePattern {
    fn new(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            anyhow::bail!("Exclude pattern cannot be empty");
        }
        if trimmed.len() > MAX_PATTERN_LENGTH {
            anyhow::bail!(
                "Exclude pattern is too long ({} characters, maximum: {})",
                trimmed.len(),
                MAX_PATTERN_LENGTH
            );
        }

        let matcher = Pattern::new(trimmed)
            .map_err(|e| anyhow::anyhow!("Invalid exclude pattern '{}': {}", pattern, e))?;

        Ok(Self {
            original: pattern.to_string(),
            matcher,
            matched: Cell::new(false),
        })
    }

    fn matches(&self, relative: &str) -> bool {
        let is_match = self.matcher.matches(relative);
        if is_match {
            self.matched.set(true);
        }
        is_match
    }
}
