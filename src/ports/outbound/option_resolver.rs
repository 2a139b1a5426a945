/// Kind of value an analyzer option accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Flag,
    Value,
}

/// Command-line option contributed by an analyzer during initialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerOption {
    /// Long name without the leading dashes, e.g. `disable-npm`
    pub name: &'static str,
    pub help: &'static str,
    pub kind: OptionKind,
}

impl AnalyzerOption {
    pub const fn flag(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: OptionKind::Flag,
        }
    }

    pub const fn value(name: &'static str, help: &'static str) -> Self {
        Self {
            name,
            help,
            kind: OptionKind::Value,
        }
    }
}

/// OptionResolver port exposing resolved analyzer options
///
/// Unknown names resolve to `false` / `None` so analyzers never fail on a
/// missing registration.
pub trait OptionResolver {
    fn flag(&self, name: &str) -> bool;

    fn value(&self, name: &str) -> Option<String>;
}
