use bomgraph::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock Analyzer handling `*.mock` files
///
/// Each file becomes a generic root named after the file stem that depends on
/// every library listed in the file, one `name@version` per line.
#[derive(Default, Clone)]
pub struct MockAnalyzer {
    pub seen: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen_files(&self) -> Vec<PathBuf> {
        self.seen.lock().unwrap().clone()
    }
}

impl Analyzer for MockAnalyzer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn patterns(&self) -> &[&'static str] {
        &["**/*.mock"]
    }

    fn can_handle(&self, _context: &AnalysisContext<'_>, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "mock")
    }

    fn analyze(&self, context: &mut AnalysisContext<'_>, path: &Path) -> Result<()> {
        self.seen.lock().unwrap().push(path.to_path_buf());

        let stem = path.file_stem().unwrap().to_string_lossy().to_string();
        let root = context.add_component(Component::new(
            Ecosystem::Generic,
            &stem,
            "1.0.0",
            ComponentKind::Root,
        )?);

        let content = std::fs::read_to_string(path)?;
        for line in content.lines().filter(|l| !l.trim().is_empty()) {
            let Some((name, version)) = line.trim().split_once('@') else {
                context
                    .add_error(format!("Malformed line '{}'", line))
                    .with_context("Path", stem.clone());
                continue;
            };
            let library = context.add_component(Component::new(
                Ecosystem::Generic,
                name,
                version,
                ComponentKind::Library,
            )?);
            context.connect(root, library, None)?;
        }
        Ok(())
    }
}
