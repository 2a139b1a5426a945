use semver::{BuildMetadata, Prerelease};
use std::cmp::Ordering;
use std::fmt;

/// Numeric version with an optional fourth (revision) component.
///
/// npm and Poetry versions never use the revision; NuGet versions may
/// (`4.7.0.1`). Parsing is lenient: an optional `v`/`=` prefix is stripped
/// and missing minor/patch components default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SemanticVersion {
    version: semver::Version,
    revision: u64,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            version: semver::Version::new(major, minor, patch),
            revision: 0,
        }
    }

    /// Parses a version string, returning `None` when it is not numeric.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let text = text.strip_prefix('=').unwrap_or(text).trim_start();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        if !text.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }

        let (rest, build) = match text.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (text, None),
        };
        let (core, pre) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 4 {
            return None;
        }

        let mut numbers = [0u64; 4];
        for (index, part) in parts.iter().enumerate() {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            numbers[index] = part.parse().ok()?;
        }

        let mut version = semver::Version::new(numbers[0], numbers[1], numbers[2]);
        if let Some(pre) = pre {
            version.pre = Prerelease::new(pre).ok()?;
        }
        if let Some(build) = build {
            version.build = BuildMetadata::new(build).ok()?;
        }

        Some(Self {
            version,
            revision: numbers[3],
        })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn patch(&self) -> u64 {
        self.version.patch
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pre(&self) -> &Prerelease {
        &self.version.pre
    }

    pub fn is_prerelease(&self) -> bool {
        !self.version.pre.is_empty()
    }

    /// Same version with prerelease and build metadata removed.
    pub fn release(&self) -> Self {
        let mut version = semver::Version::new(self.major(), self.minor(), self.patch());
        version.pre = Prerelease::EMPTY;
        Self {
            version,
            revision: self.revision,
        }
    }

    pub(crate) fn with_prerelease(mut self, pre: &str) -> Self {
        self.version.pre = Prerelease::new(pre).unwrap_or(Prerelease::EMPTY);
        self
    }

    /// Returns true when both versions share `major.minor.patch.revision`.
    pub fn same_release(&self, other: &SemanticVersion) -> bool {
        self.major() == other.major()
            && self.minor() == other.minor()
            && self.patch() == other.patch()
            && self.revision == other.revision
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major()
            .cmp(&other.major())
            .then(self.minor().cmp(&other.minor()))
            .then(self.patch().cmp(&other.patch()))
            .then(self.revision.cmp(&other.revision))
            .then_with(|| self.version.pre.cmp(&other.version.pre))
            .then_with(|| self.version.build.cmp(&other.version.build))
    }
}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if !self.version.pre.is_empty() {
            write!(f, "-{}", self.version.pre)?;
        }
        if !self.version.build.is_empty() {
            write!(f, "+{}", self.version.build)?;
        }
        Ok(())
    }
}

/// Parsed component version
///
/// Anything that is not a recognizable numeric version (git refs, local
/// paths, branch names, tarball URLs) is kept verbatim as `Opaque`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentVersion {
    Semantic(SemanticVersion),
    Opaque(String),
}

impl ComponentVersion {
    pub fn parse(raw: &str) -> Self {
        match SemanticVersion::parse(raw) {
            Some(version) => ComponentVersion::Semantic(version),
            None => ComponentVersion::Opaque(raw.to_string()),
        }
    }

    pub fn as_semantic(&self) -> Option<&SemanticVersion> {
        match self {
            ComponentVersion::Semantic(version) => Some(version),
            ComponentVersion::Opaque(_) => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            ComponentVersion::Semantic(_) => None,
            ComponentVersion::Opaque(text) => Some(text),
        }
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentVersion::Semantic(version) => write!(f, "{}", version),
            ComponentVersion::Opaque(text) => write!(f, "{}", text),
        }
    }
}
