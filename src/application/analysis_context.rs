use crate::ports::outbound::OptionResolver;
use crate::sbom_generation::domain::{
    BomFile, BomRef, Component, ComponentGraph, Diagnostic, DiagnosticContext, Diagnostics,
    GraphError, NodeId,
};
use std::path::{Path, PathBuf};

/// What the current file contributed.
///
/// Delta nodes are handles into the cumulative graph; delta edges are the
/// dependencies discovered while analyzing this file only.
#[derive(Debug, Default)]
pub struct Delta {
    graph: ComponentGraph<NodeId>,
    files: Vec<BomFile>,
}

impl Delta {
    pub fn graph(&self) -> &ComponentGraph<NodeId> {
        &self.graph
    }

    pub fn files(&self) -> &[BomFile] {
        &self.files
    }

    /// Cumulative ids of every node touched by this file, in discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.nodes().map(|(_, id)| *id)
    }

    /// Cumulative ids `node` gained an edge to while analyzing this file.
    pub fn outgoing(&self, node: NodeId) -> Vec<NodeId> {
        let Some(local) = self.graph.find(&node) else {
            return Vec::new();
        };
        self.graph
            .outgoing(local)
            .filter_map(|end| self.graph.get(end).copied())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.files.is_empty()
    }

    fn clear(&mut self) {
        self.graph.clear();
        self.files.clear();
    }
}

/// Per-run analysis state shared by every analyzer.
///
/// Components are canonicalized against the cumulative graph, which only
/// grows. Edges and file records go to the delta, which the engine resets
/// before each file and harvests after it.
pub struct AnalysisContext<'a> {
    root: PathBuf,
    options: &'a dyn OptionResolver,
    graph: ComponentGraph<Component>,
    files: Vec<BomFile>,
    delta: Delta,
    diagnostics: DiagnosticContext,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(root: impl Into<PathBuf>, options: &'a dyn OptionResolver) -> Self {
        Self {
            root: root.into(),
            options,
            graph: ComponentGraph::new(),
            files: Vec::new(),
            delta: Delta::default(),
            diagnostics: DiagnosticContext::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn options(&self) -> &dyn OptionResolver {
        self.options
    }

    pub fn graph(&self) -> &ComponentGraph<Component> {
        &self.graph
    }

    pub fn delta(&self) -> &Delta {
        &self.delta
    }

    pub fn files(&self) -> &[BomFile] {
        &self.files
    }

    /// Registers `component` and returns the id of the canonical instance.
    ///
    /// Callers enrich the canonical component through [`Self::component_mut`],
    /// so repeated encounters of a package converge on one node.
    pub fn add_component(&mut self, component: Component) -> NodeId {
        let known = self.graph.node_count();
        let id = self.graph.add(component);
        if self.graph.node_count() > known {
            self.delta.graph.add(id);
        }
        id
    }

    pub fn component(&self, id: NodeId) -> Option<&Component> {
        self.graph.get(id)
    }

    pub fn component_mut(&mut self, id: NodeId) -> Option<&mut Component> {
        self.graph.get_mut(id)
    }

    pub fn find(&self, bom_ref: &BomRef) -> Option<NodeId> {
        self.graph.find(bom_ref)
    }

    /// Records the dependency `start -> end` for the current file.
    pub fn connect(
        &mut self,
        start: NodeId,
        end: NodeId,
        metadata: Option<&str>,
    ) -> Result<(), GraphError> {
        if start == end {
            let node = self
                .graph
                .get(start)
                .map(|c| c.bom_ref().to_string())
                .unwrap_or_else(|| format!("{:?}", start));
            return Err(GraphError::SelfDependency { node });
        }
        self.delta.graph.connect(start, end, metadata)
    }

    /// Adds a plain file record; a path already recorded in this run is ignored.
    pub fn add_file(&mut self, file: BomFile) {
        if self.files.iter().any(|f| f.path == file.path) {
            return;
        }
        self.files.push(file.clone());
        self.delta.files.push(file);
    }

    /// Clears the delta before the next file.
    pub fn reset(&mut self) {
        self.delta.clear();
    }

    /// Removes and returns the diagnostics collected so far.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}

impl Diagnostics for AnalysisContext<'_> {
    fn diagnostic_context(&self) -> &DiagnosticContext {
        &self.diagnostics
    }

    fn diagnostic_context_mut(&mut self) -> &mut DiagnosticContext {
        &mut self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbom_generation::domain::{BomHash, ComponentKind, Ecosystem, HashAlgorithm};
    use crate::sbom_generation::domain::SCOPE_KEY;

    struct NoOptions;

    impl OptionResolver for NoOptions {
        fn flag(&self, _name: &str) -> bool {
            false
        }

        fn value(&self, _name: &str) -> Option<String> {
            None
        }
    }

    fn npm(name: &str, version: &str) -> Component {
        Component::new(Ecosystem::Npm, name, version, ComponentKind::Library).unwrap()
    }

    #[test]
    fn test_add_component_canonicalizes_and_records_new_nodes_in_delta() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);

        let first = context.add_component(npm("leftpad", "1.0.0"));
        context.reset();
        let again = context.add_component(npm("LeftPad", "1.0.0"));

        assert_eq!(first, again);
        assert_eq!(context.graph().node_count(), 1);
        assert!(context.delta().is_empty());
    }

    #[test]
    fn test_enrichment_converges_on_canonical_component() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);

        let id = context.add_component(npm("leftpad", "1.0.0"));
        context
            .component_mut(id)
            .unwrap()
            .set_hash(Some(BomHash::new(HashAlgorithm::Sha512, "AB")));
        let again = context.add_component(npm("leftpad", "1.0.0"));

        assert!(context.component(again).unwrap().hash().is_some());
    }

    #[test]
    fn test_connect_writes_only_to_delta() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);
        let a = context.add_component(npm("a", "1.0.0"));
        let b = context.add_component(npm("b", "1.0.0"));

        context.connect(a, b, Some("net8.0")).unwrap();
        assert_eq!(context.delta().outgoing(a), vec![b]);
        assert_eq!(context.graph().edge_count(), 0);

        context.reset();
        assert!(context.delta().outgoing(a).is_empty());
    }

    #[test]
    fn test_connect_rejects_self_dependency() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);
        let a = context.add_component(npm("a", "1.0.0"));

        let result = context.connect(a, a, None);
        assert!(matches!(result, Err(GraphError::SelfDependency { .. })));
    }

    #[test]
    fn test_add_file_deduplicates_by_path() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);
        let hash = BomHash::new(HashAlgorithm::Sha256, "00");

        context.add_file(BomFile::new("LICENSE", hash.clone()));
        context.reset();
        context.add_file(BomFile::new("LICENSE", hash));

        assert_eq!(context.files().len(), 1);
        assert!(context.delta().files().is_empty());
    }

    #[test]
    fn test_scoped_diagnostics_through_context() {
        let options = NoOptions;
        let mut context = AnalysisContext::new("/repo", &options);
        {
            let mut scoped = context.scope("net8.0");
            scoped.add_error("Could not find library 'Core' in graph");
        }
        context.add_warning("outside");

        let diagnostics = context.take_diagnostics();
        assert_eq!(diagnostics[0].get_context(SCOPE_KEY), Some("net8.0"));
        assert_eq!(diagnostics[1].get_context(SCOPE_KEY), None);
        assert!(!context.has_errors());
    }
}
