use bomgraph::prelude::*;
use std::collections::{HashMap, HashSet};

/// Mock OptionResolver with explicitly set flags and values
#[derive(Default, Clone)]
pub struct MockOptionResolver {
    flags: HashSet<String>,
    values: HashMap<String, String>,
}

impl MockOptionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(mut self, name: &str) -> Self {
        self.flags.insert(name.to_string());
        self
    }

    pub fn with_value(mut self, name: &str, value: &str) -> Self {
        self.values.insert(name.to_string(), value.to_string());
        self
    }
}

impl OptionResolver for MockOptionResolver {
    fn flag(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    fn value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}
