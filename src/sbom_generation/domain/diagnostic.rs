use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Context key holding the slash-joined scope path
pub const SCOPE_KEY: &str = "Scope";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Error => write!(f, "Error"),
            DiagnosticKind::Warning => write!(f, "Warning"),
            DiagnosticKind::Info => write!(f, "Info"),
        }
    }
}

/// A single error, warning or informational note raised during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    kind: DiagnosticKind,
    message: String,
    context: IndexMap<String, String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context: IndexMap::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &IndexMap<String, String> {
        &self.context
    }

    pub fn get_context(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    pub fn with_context(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.context.insert(key.into(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }
}

/// Stack-based diagnostic collector.
///
/// Every diagnostic created while a scope is active gets a `Scope` context
/// entry built from the active scope names, outermost first.
#[derive(Debug, Default)]
pub struct DiagnosticContext {
    scope: Vec<String>,
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn current_scope(&self) -> Option<String> {
        if self.scope.is_empty() {
            None
        } else {
            Some(self.scope.join("/"))
        }
    }

    pub fn scope_depth(&self) -> usize {
        self.scope.len()
    }

    pub fn add(&mut self, kind: DiagnosticKind, message: impl Into<String>) -> &mut Diagnostic {
        let mut diagnostic = Diagnostic::new(kind, message);
        if let Some(scope) = self.current_scope() {
            diagnostic.with_context(SCOPE_KEY, scope);
        }

        self.diagnostics.push(diagnostic);
        let last = self.diagnostics.len() - 1;
        &mut self.diagnostics[last]
    }

    /// Removes and returns everything collected so far; the scope stack is kept.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn push_scope(&mut self, name: String) {
        self.scope.push(name);
    }

    fn pop_scope(&mut self) {
        self.scope.pop();
    }
}

/// Anything that carries a [`DiagnosticContext`].
///
/// Implementors get the reporting helpers and scoped acquisition for free.
pub trait Diagnostics: Sized {
    fn diagnostic_context(&self) -> &DiagnosticContext;

    fn diagnostic_context_mut(&mut self) -> &mut DiagnosticContext;

    fn add_error(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.diagnostic_context_mut()
            .add(DiagnosticKind::Error, message)
    }

    fn add_warning(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.diagnostic_context_mut()
            .add(DiagnosticKind::Warning, message)
    }

    fn add_info(&mut self, message: impl Into<String>) -> &mut Diagnostic {
        self.diagnostic_context_mut()
            .add(DiagnosticKind::Info, message)
    }

    fn has_errors(&self) -> bool {
        self.diagnostic_context().has_errors()
    }

    /// Enters scope `name` until the returned guard is dropped.
    ///
    /// The guard dereferences to the context, so work inside the scope goes
    /// through it. The pop happens on every exit path, including `?`.
    fn scope(&mut self, name: impl Into<String>) -> ScopeGuard<'_, Self> {
        self.diagnostic_context_mut().push_scope(name.into());
        ScopeGuard { target: self }
    }
}

impl Diagnostics for DiagnosticContext {
    fn diagnostic_context(&self) -> &DiagnosticContext {
        self
    }

    fn diagnostic_context_mut(&mut self) -> &mut DiagnosticContext {
        self
    }
}

/// Active diagnostic scope; pops its name when dropped.
pub struct ScopeGuard<'a, C: Diagnostics> {
    target: &'a mut C,
}

impl<C: Diagnostics> Deref for ScopeGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.target
    }
}

impl<C: Diagnostics> DerefMut for ScopeGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.target
    }
}

impl<C: Diagnostics> Drop for ScopeGuard<'_, C> {
    fn drop(&mut self) {
        self.target.diagnostic_context_mut().pop_scope();
    }
}
