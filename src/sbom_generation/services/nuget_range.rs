use crate::sbom_generation::domain::{ComponentVersion, SemanticVersion};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Bound {
    version: SemanticVersion,
    inclusive: bool,
}

impl Bound {
    fn inclusive(version: SemanticVersion) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    fn exclusive(version: SemanticVersion) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }
}

/// NuGet version interval.
///
/// Supported notations:
/// - `1.0` minimum inclusive
/// - `[1.0]` exact
/// - `[1.0,2.0)`, `(1.0,)`, `(,2.0]` bracketed intervals
/// - `1.*`, `1.2.*` floating versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuGetVersionRange {
    raw: String,
    min: Option<Bound>,
    max: Option<Bound>,
}

impl NuGetVersionRange {
    /// Returns `None` when the text is not a valid NuGet range.
    pub fn parse(text: &str) -> Option<Self> {
        let raw = text.trim();
        if raw.is_empty() {
            return None;
        }

        let (min, max) = if raw.starts_with('[') || raw.starts_with('(') {
            parse_interval(raw)?
        } else if raw.ends_with('*') {
            parse_floating(raw)?
        } else {
            (Some(Bound::inclusive(SemanticVersion::parse(raw)?)), None)
        };

        Some(Self {
            raw: raw.to_string(),
            min,
            max,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        let above_min = match &self.min {
            Some(bound) if bound.inclusive => version >= &bound.version,
            Some(bound) => version > &bound.version,
            None => true,
        };
        let below_max = match &self.max {
            Some(bound) if bound.inclusive => version <= &bound.version,
            Some(bound) => version < &bound.version,
            None => true,
        };
        above_min && below_max
    }

    /// Highest candidate inside the interval.
    pub fn best_match<'a, I>(&self, versions: I) -> Option<&'a ComponentVersion>
    where
        I: IntoIterator<Item = &'a ComponentVersion>,
    {
        versions
            .into_iter()
            .filter_map(|v| v.as_semantic().map(|semantic| (v, semantic)))
            .filter(|(_, semantic)| self.satisfies(semantic))
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(v, _)| v)
    }
}

impl fmt::Display for NuGetVersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

type Interval = (Option<Bound>, Option<Bound>);

fn parse_interval(raw: &str) -> Option<Interval> {
    let min_inclusive = raw.starts_with('[');
    let max_inclusive = raw.ends_with(']');
    if !max_inclusive && !raw.ends_with(')') {
        return None;
    }
    let inner = raw.get(1..raw.len() - 1)?.trim();

    let Some((low, high)) = inner.split_once(',') else {
        // `[1.0]` is the only single-version bracket form.
        if !(min_inclusive && max_inclusive) {
            return None;
        }
        let version = SemanticVersion::parse(inner)?;
        return Some((
            Some(Bound::inclusive(version.clone())),
            Some(Bound::inclusive(version)),
        ));
    };

    let bound = |text: &str, inclusive: bool| -> Option<Option<Bound>> {
        let text = text.trim();
        if text.is_empty() {
            return Some(None);
        }
        let version = SemanticVersion::parse(text)?;
        Some(Some(if inclusive {
            Bound::inclusive(version)
        } else {
            Bound::exclusive(version)
        }))
    };

    let min = bound(low, min_inclusive)?;
    let max = bound(high, max_inclusive)?;
    if min.is_none() && max.is_none() {
        return None;
    }
    Some((min, max))
}

fn parse_floating(raw: &str) -> Option<Interval> {
    let prefix = raw.trim_end_matches('*');

    if let Some(release) = prefix.strip_suffix('-') {
        // `1.0.0-*`: any prerelease of 1.0.0, or 1.0.0 itself
        let version = SemanticVersion::parse(release)?;
        return Some((
            Some(Bound::inclusive(version.clone().with_prerelease("0"))),
            Some(Bound::inclusive(version)),
        ));
    }

    let prefix = prefix.trim_end_matches('.');
    if prefix.is_empty() {
        return Some((None, None));
    }

    let numbers = prefix
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    let (min, max) = match numbers.as_slice() {
        [major] => (
            SemanticVersion::new(*major, 0, 0),
            SemanticVersion::new(major.checked_add(1)?, 0, 0),
        ),
        [major, minor] => (
            SemanticVersion::new(*major, *minor, 0),
            SemanticVersion::new(*major, minor.checked_add(1)?, 0),
        ),
        [major, minor, patch] => (
            SemanticVersion::new(*major, *minor, *patch),
            SemanticVersion::parse(&format!("{}.{}.{}.1", major, minor, patch))?,
        ),
        _ => return None,
    };
    Some((Some(Bound::inclusive(min)), Some(Bound::exclusive(max))))
}
