//! Temp-dir workspace used by the analyzer unit tests
use super::Analyzer;
use crate::adapters::outbound::filesystem::FileSystemReader;
use crate::application::analysis_context::AnalysisContext;
use crate::ports::outbound::OptionResolver;
use crate::sbom_generation::domain::{Component, Diagnostic, NodeId};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub struct TestOptions {
    flags: HashSet<String>,
}

impl OptionResolver for TestOptions {
    fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn value(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Everything one `analyze` call produced
pub struct Outcome {
    pub components: Vec<Component>,
    /// (from name, to name, metadata)
    pub edges: Vec<(String, String, Option<String>)>,
    /// (from name, to `name@version`)
    targets: Vec<(String, String)>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Outcome {
    pub fn component(&self, name: &str) -> &Component {
        self.components
            .iter()
            .find(|c| c.name() == name)
            .unwrap_or_else(|| panic!("component {} not found", name))
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.iter().any(|(f, t, _)| f == from && t == to)
    }

    /// Sorted `name@version` of everything `from` depends on.
    pub fn targets(&self, from: &str) -> Vec<String> {
        let mut targets: Vec<String> = self
            .targets
            .iter()
            .filter(|(f, _)| f == from)
            .map(|(_, t)| t.clone())
            .collect();
        targets.sort();
        targets
    }

    pub fn errors(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

pub fn names(outcome: &Outcome) -> Vec<&str> {
    outcome.components.iter().map(Component::name).collect()
}

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn reader(&self) -> FileSystemReader {
        FileSystemReader::new()
    }

    pub fn options(&self, flags: &[&str]) -> TestOptions {
        TestOptions {
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    pub fn run(&self, analyzer: &dyn Analyzer, relative: &str) -> Outcome {
        self.run_with_flags(analyzer, relative, &[])
    }

    pub fn run_with_flags(&self, analyzer: &dyn Analyzer, relative: &str, flags: &[&str]) -> Outcome {
        let options = self.options(flags);
        let mut context = AnalysisContext::new(self.dir.path(), &options);
        let path = self.dir.path().join(relative);

        assert!(analyzer.can_handle(&context, &path), "cannot handle {}", relative);
        analyzer.analyze(&mut context, &path).unwrap();

        let name_of = |context: &AnalysisContext<'_>, id: NodeId| {
            context
                .component(id)
                .map(|c| c.name().to_string())
                .unwrap_or_default()
        };

        let mut edges = Vec::new();
        let mut targets = Vec::new();
        for edge in context.delta().graph().edges() {
            let (Some(from), Some(to)) = (
                context.delta().graph().get(edge.start),
                context.delta().graph().get(edge.end),
            ) else {
                continue;
            };
            if let Some(to) = context.component(*to) {
                targets.push((
                    name_of(&context, *from),
                    format!("{}@{}", to.name(), to.version()),
                ));
            }
            edges.push((
                name_of(&context, *from),
                name_of(&context, *to),
                edge.metadata.map(str::to_string),
            ));
        }

        Outcome {
            components: context.graph().nodes().map(|(_, c)| c.clone()).collect(),
            edges,
            targets,
            diagnostics: context.take_diagnostics(),
        }
    }
}
