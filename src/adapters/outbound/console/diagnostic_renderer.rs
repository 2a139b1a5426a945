use crate::sbom_generation::domain::{Diagnostic, DiagnosticKind};
use owo_colors::OwoColorize;
use std::io::{self, IsTerminal, Write};

/// Renders the diagnostics of a finished run as a list on stderr
///
/// Colors are only used when stderr is a terminal.
pub struct DiagnosticRenderer {
    colored: bool,
}

impl DiagnosticRenderer {
    pub fn new() -> Self {
        Self {
            colored: io::stderr().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { colored: false }
    }

    pub fn render(&self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for diagnostic in diagnostics {
            out.push_str(&self.render_one(diagnostic));
            out.push('\n');
        }

        if !diagnostics.is_empty() {
            let errors = count(diagnostics, DiagnosticKind::Error);
            let warnings = count(diagnostics, DiagnosticKind::Warning);
            out.push_str(&format!("{} error(s), {} warning(s)\n", errors, warnings));
        }
        out
    }

    pub fn print(&self, diagnostics: &[Diagnostic]) {
        // stderr write failures are not actionable
        let _ = io::stderr().write_all(self.render(diagnostics).as_bytes());
    }

    fn render_one(&self, diagnostic: &Diagnostic) -> String {
        let label = diagnostic.kind().to_string().to_lowercase();
        let label = if self.colored {
            match diagnostic.kind() {
                DiagnosticKind::Error => label.red().bold().to_string(),
                DiagnosticKind::Warning => label.yellow().bold().to_string(),
                DiagnosticKind::Info => label.cyan().to_string(),
            }
        } else {
            label
        };

        let mut line = format!("{}: {}", label, diagnostic.message());
        for (key, value) in diagnostic.context() {
            let entry = format!("\n    {}: {}", key, value);
            if self.colored {
                line.push_str(&entry.dimmed().to_string());
            } else {
                line.push_str(&entry);
            }
        }
        line
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn count(diagnostics: &[Diagnostic], kind: DiagnosticKind) -> usize {
    diagnostics.iter().filter(|d| d.kind() == kind).count()
}
