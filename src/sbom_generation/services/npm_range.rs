use crate::sbom_generation::domain::{ComponentVersion, SemanticVersion};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comparator {
    operator: Operator,
    version: SemanticVersion,
}

impl Comparator {
    fn new(operator: Operator, version: SemanticVersion) -> Self {
        Self { operator, version }
    }

    fn test(&self, candidate: &SemanticVersion) -> bool {
        match self.operator {
            Operator::Lt => candidate < &self.version,
            Operator::Le => candidate <= &self.version,
            Operator::Gt => candidate > &self.version,
            Operator::Ge => candidate >= &self.version,
            Operator::Eq => candidate == &self.version,
        }
    }
}

/// Partially specified version as it appears inside a range (`1`, `1.2.x`, `*`)
#[derive(Debug, Clone, Default)]
struct Partial {
    major: Option<u64>,
    minor: Option<u64>,
    patch: Option<u64>,
    pre: Option<String>,
}

impl Partial {
    fn parse(text: &str) -> Option<Self> {
        let text = text.strip_prefix('v').unwrap_or(text);
        if text.is_empty() {
            return Some(Self::default());
        }

        let core = text.split_once('+').map(|(core, _)| core).unwrap_or(text);
        let (core, pre) = match core.split_once('-') {
            Some((core, pre)) => (core, Some(pre.to_string())),
            None => (core, None),
        };

        let mut numbers = [None; 3];
        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return None;
        }
        for (index, part) in parts.iter().enumerate() {
            if matches!(*part, "x" | "X" | "*") {
                break;
            }
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            numbers[index] = Some(part.parse().ok()?);
        }

        Some(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            pre,
        })
    }

    fn is_full(&self) -> bool {
        self.patch.is_some()
    }

    /// Fills missing components with zero.
    fn floor(&self) -> SemanticVersion {
        let version = SemanticVersion::new(
            self.major.unwrap_or(0),
            self.minor.unwrap_or(0),
            self.patch.unwrap_or(0),
        );
        match (&self.pre, self.is_full()) {
            (Some(pre), true) => version.with_prerelease(pre),
            _ => version,
        }
    }

    /// First version above everything the partial matches (`1.2` → `1.3.0`).
    ///
    /// `Some(None)` for a bare wildcard; `None` when the next release does not fit in a `u64`.
    fn ceiling(&self) -> Option<Option<SemanticVersion>> {
        Some(match (self.major, self.minor) {
            (None, _) => None,
            (Some(major), None) => Some(SemanticVersion::new(major.checked_add(1)?, 0, 0)),
            (Some(major), Some(minor)) => Some(SemanticVersion::new(major, minor.checked_add(1)?, 0)),
        })
    }
}

/// npm-style semver range (`^1.2.0 || >=3.0.0 <4`).
///
/// Ranges that cannot be parsed (git URLs, tags such as `latest`, local paths)
/// are kept as text and only match a component whose raw version is identical.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmVersionRange {
    raw: String,
    sets: Option<Vec<Vec<Comparator>>>,
}

impl NpmVersionRange {
    pub fn parse(text: &str) -> Self {
        let raw = text.trim().to_string();
        let sets = raw
            .split("||")
            .map(parse_comparator_set)
            .collect::<Option<Vec<_>>>();

        Self { raw, sets }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_opaque(&self) -> bool {
        self.sets.is_none()
    }

    pub fn satisfies(&self, version: &SemanticVersion) -> bool {
        match &self.sets {
            Some(sets) => sets.iter().any(|set| set_satisfies(set, version)),
            None => false,
        }
    }

    pub fn matches(&self, version: &ComponentVersion) -> bool {
        match (version, &self.sets) {
            (ComponentVersion::Semantic(version), Some(_)) => self.satisfies(version),
            (ComponentVersion::Opaque(text), None) => text.trim() == self.raw,
            _ => false,
        }
    }

    /// Highest candidate version satisfying the range.
    pub fn best_match<'a, I>(&self, versions: I) -> Option<&'a ComponentVersion>
    where
        I: IntoIterator<Item = &'a ComponentVersion>,
    {
        let matching = versions.into_iter().filter(|v| self.matches(v));
        if self.is_opaque() {
            return matching.into_iter().next();
        }
        matching.max_by(|a, b| a.as_semantic().cmp(&b.as_semantic()))
    }
}

impl fmt::Display for NpmVersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

fn set_satisfies(set: &[Comparator], version: &SemanticVersion) -> bool {
    if !set.iter().all(|c| c.test(version)) {
        return false;
    }
    if !version.is_prerelease() {
        return true;
    }

    // A prerelease only matches when the set explicitly opts into
    // prereleases of the same release tuple.
    set.iter()
        .any(|c| c.version.is_prerelease() && c.version.same_release(version))
}

fn parse_comparator_set(text: &str) -> Option<Vec<Comparator>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    if tokens.len() == 3 && tokens[1] == "-" {
        return parse_hyphen_range(tokens[0], tokens[2]);
    }

    let mut comparators = Vec::new();
    let mut pending_operator: Option<&str> = None;
    for token in tokens {
        if token.chars().all(|c| matches!(c, '<' | '>' | '=' | '~' | '^')) {
            if pending_operator.is_some() {
                return None;
            }
            pending_operator = Some(token);
            continue;
        }

        let joined;
        let token = match pending_operator.take() {
            Some(operator) => {
                joined = format!("{}{}", operator, token);
                joined.as_str()
            }
            None => token,
        };
        comparators.extend(parse_comparator(token)?);
    }

    if pending_operator.is_some() {
        return None;
    }
    Some(comparators)
}

fn parse_hyphen_range(from: &str, to: &str) -> Option<Vec<Comparator>> {
    let from = Partial::parse(from)?;
    let to = Partial::parse(to)?;

    let mut comparators = Vec::new();
    if from.major.is_some() {
        comparators.push(Comparator::new(Operator::Ge, from.floor()));
    }
    if to.is_full() {
        comparators.push(Comparator::new(Operator::Le, to.floor()));
    } else if let Some(ceiling) = to.ceiling()? {
        comparators.push(Comparator::new(Operator::Lt, ceiling));
    }
    Some(comparators)
}

fn parse_comparator(token: &str) -> Option<Vec<Comparator>> {
    const OPERATORS: [&str; 8] = [">=", "<=", "~>", ">", "<", "=", "~", "^"];

    let (operator, rest) = OPERATORS
        .iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (*op, rest)))
        .unwrap_or(("", token));
    let partial = Partial::parse(rest)?;

    let comparators = match operator {
        "" | "=" => desugar_exact(&partial)?,
        "^" => desugar_caret(&partial)?,
        "~" | "~>" => desugar_tilde(&partial)?,
        ">" => desugar_greater(&partial)?,
        ">=" => match partial.major {
            Some(_) => vec![Comparator::new(Operator::Ge, partial.floor())],
            None => Vec::new(),
        },
        "<" => match partial.major {
            Some(_) => vec![Comparator::new(Operator::Lt, partial.floor())],
            None => vec![nothing()],
        },
        "<=" => desugar_less_equal(&partial)?,
        _ => return None,
    };
    Some(comparators)
}

/// Comparator no version can satisfy.
fn nothing() -> Comparator {
    Comparator::new(
        Operator::Lt,
        SemanticVersion::new(0, 0, 0).with_prerelease("0"),
    )
}

fn between(partial: &Partial, ceiling: SemanticVersion) -> Vec<Comparator> {
    vec![
        Comparator::new(Operator::Ge, partial.floor()),
        Comparator::new(Operator::Lt, ceiling),
    ]
}

// The desugar functions return `None` when an upper bound overflows.

fn desugar_exact(partial: &Partial) -> Option<Vec<Comparator>> {
    if partial.is_full() {
        return Some(vec![Comparator::new(Operator::Eq, partial.floor())]);
    }
    Some(match partial.ceiling()? {
        Some(ceiling) => between(partial, ceiling),
        None => Vec::new(),
    })
}

fn desugar_caret(partial: &Partial) -> Option<Vec<Comparator>> {
    let (Some(major), minor, patch) = (partial.major, partial.minor, partial.patch) else {
        return Some(Vec::new());
    };

    let ceiling = match (major, minor, patch) {
        (0, None, _) => SemanticVersion::new(1, 0, 0),
        (0, Some(0), Some(patch)) => SemanticVersion::new(0, 0, patch.checked_add(1)?),
        (0, Some(minor), _) => SemanticVersion::new(0, minor.checked_add(1)?, 0),
        (major, _, _) => SemanticVersion::new(major.checked_add(1)?, 0, 0),
    };
    Some(between(partial, ceiling))
}

fn desugar_tilde(partial: &Partial) -> Option<Vec<Comparator>> {
    let (Some(major), minor) = (partial.major, partial.minor) else {
        return Some(Vec::new());
    };

    let ceiling = match minor {
        Some(minor) => SemanticVersion::new(major, minor.checked_add(1)?, 0),
        None => SemanticVersion::new(major.checked_add(1)?, 0, 0),
    };
    Some(between(partial, ceiling))
}

fn desugar_greater(partial: &Partial) -> Option<Vec<Comparator>> {
    if partial.is_full() {
        return Some(vec![Comparator::new(Operator::Gt, partial.floor())]);
    }
    Some(match partial.ceiling()? {
        Some(ceiling) => vec![Comparator::new(Operator::Ge, ceiling)],
        None => vec![nothing()],
    })
}

fn desugar_less_equal(partial: &Partial) -> Option<Vec<Comparator>> {
    if partial.is_full() {
        return Some(vec![Comparator::new(Operator::Le, partial.floor())]);
    }
    Some(match partial.ceiling()? {
        Some(ceiling) => vec![Comparator::new(Operator::Lt, ceiling)],
        None => Vec::new(),
    })
}
