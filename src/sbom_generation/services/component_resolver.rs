use super::npm_range::NpmVersionRange;
use super::nuget_range::NuGetVersionRange;
use crate::sbom_generation::domain::{Component, ComponentGraph, ComponentVersion, Ecosystem, NodeId};
use std::collections::HashSet;

/// Outcome of matching a declared dependency against the components already in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A same-named component satisfies the declared range.
    Exact(NodeId),
    /// Nothing satisfies the range but exactly one same-named component exists.
    Fallback(NodeId),
    NotFound,
}

impl Resolution {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Resolution::Exact(id) | Resolution::Fallback(id) => Some(*id),
            Resolution::NotFound => None,
        }
    }
}

/// Links declared dependencies to resolved components
pub struct ComponentResolver;

impl ComponentResolver {
    /// Resolves an npm dependency. Names compare case-sensitively.
    pub fn resolve_npm(
        graph: &ComponentGraph<Component>,
        name: &str,
        range: &NpmVersionRange,
    ) -> Resolution {
        let candidates = Self::candidates(graph, Ecosystem::Npm, |n| n == name, None);
        let best = range.best_match(candidates.iter().map(|(_, c)| c.parsed_version()));
        Self::choose(&candidates, best)
    }

    /// Resolves an npm dependency among `preferred` first (the packages one
    /// lockfile installed), then against the whole graph.
    pub fn resolve_npm_preferring(
        graph: &ComponentGraph<Component>,
        preferred: &HashSet<NodeId>,
        name: &str,
        range: &NpmVersionRange,
    ) -> Resolution {
        let local = Self::candidates(graph, Ecosystem::Npm, |n| n == name, Some(preferred));
        let best = range.best_match(local.iter().map(|(_, c)| c.parsed_version()));
        match Self::choose(&local, best) {
            Resolution::Exact(id) => Resolution::Exact(id),
            _ => Self::resolve_npm(graph, name, range),
        }
    }

    /// Resolves a NuGet dependency. Names compare case-insensitively; a range
    /// that fails to parse matches nothing and goes through the fallback rule.
    pub fn resolve_nuget(
        graph: &ComponentGraph<Component>,
        name: &str,
        range: Option<&NuGetVersionRange>,
    ) -> Resolution {
        let candidates =
            Self::candidates(graph, Ecosystem::NuGet, |n| n.eq_ignore_ascii_case(name), None);
        let best = range
            .and_then(|range| range.best_match(candidates.iter().map(|(_, c)| c.parsed_version())));
        Self::choose(&candidates, best)
    }

    fn candidates<'g>(
        graph: &'g ComponentGraph<Component>,
        ecosystem: Ecosystem,
        name_matches: impl Fn(&str) -> bool,
        within: Option<&HashSet<NodeId>>,
    ) -> Vec<(NodeId, &'g Component)> {
        let (roots, libraries): (Vec<_>, Vec<_>) = graph
            .nodes()
            .filter(|(id, _)| within.map_or(true, |set| set.contains(id)))
            .filter(|(_, c)| c.ecosystem() == ecosystem && name_matches(c.name()))
            .partition(|(_, c)| c.is_root());

        // Local workspace packages are only linked when no published package matches by name.
        if libraries.is_empty() {
            roots
        } else {
            libraries
        }
    }

    fn choose(candidates: &[(NodeId, &Component)], best: Option<&ComponentVersion>) -> Resolution {
        if let Some(best) = best {
            if let Some((id, _)) = candidates.iter().find(|(_, c)| c.parsed_version() == best) {
                return Resolution::Exact(*id);
            }
        }

        match candidates {
            [(id, _)] => Resolution::Fallback(*id),
            _ => Resolution::NotFound,
        }
    }
}
