use bomgraph::prelude::*;
use std::sync::{Arc, Mutex};

/// One call received by [`MockProgressReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    Step {
        current: usize,
        total: usize,
        file: Option<String>,
    },
    Failure(String),
    Done(String),
}

/// Mock ProgressReporter recording every call in order
#[derive(Default, Clone)]
pub struct MockProgressReporter {
    events: Arc<Mutex<Vec<ProgressEvent>>>,
}

impl MockProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Files reported through `report_progress`, in order.
    pub fn steps(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Step { file, .. } => file,
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl ProgressReporter for MockProgressReporter {
    fn report(&self, message: &str) {
        self.push(ProgressEvent::Status(message.to_string()));
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        self.push(ProgressEvent::Step {
            current,
            total,
            file: message.map(str::to_string),
        });
    }

    fn report_error(&self, message: &str) {
        self.push(ProgressEvent::Failure(message.to_string()));
    }

    fn report_completion(&self, message: &str) {
        self.push(ProgressEvent::Done(message.to_string()));
    }
}
