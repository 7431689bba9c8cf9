//! Missed-expectation reporting.
//!
//! The registry drains itself at reconciliation and hands every expectation
//! that was never hit to a sink. Sinks are best-effort: the drain continues
//! whatever a sink does, and a sink must not call back into the registry
//! that invoked it.

use std::io::Write;
use std::sync::{Arc, Mutex};

/// An expectation that was never hit by the time the registry reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedExpectation {
    /// Address the expectation applied to.
    pub addr: usize,
    /// Annotation call-site file.
    pub file: &'static str,
    /// Annotation call-site line.
    pub line: u32,
    /// Rendered description text.
    pub description: String,
}

/// Receives missed-expectation events for rendering.
pub trait MissedRaceSink: Send + Sync {
    /// Handle one missed expectation.
    fn report_missed(&self, event: &MissedExpectation);
}

/// Render the warning banner for one missed expectation.
pub fn format_missed(tool: &str, event: &MissedExpectation) -> String {
    format!(
        "==================\n\
         WARNING: {tool}: missed expected data race\n  \
         {desc} addr={addr:#x} {file}:{line}\n\
         ==================\n",
        tool = tool,
        desc = event.description,
        addr = event.addr,
        file = event.file,
        line = event.line,
    )
}

/// Default sink: writes the banner to stderr, ignoring write errors.
pub struct StderrSink {
    tool: String,
}

impl StderrSink {
    /// Create a sink that reports under the given tool name.
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }
}

impl MissedRaceSink for StderrSink {
    fn report_missed(&self, event: &MissedExpectation) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(format_missed(&self.tool, event).as_bytes());
    }
}

/// A sink that keeps events in memory, for tests and embedders.
///
/// Clones share the same event buffer, so a registry can own one clone
/// while the test inspects another.
#[derive(Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<MissedExpectation>>>,
}

impl CollectingSink {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// All events reported so far.
    pub fn events(&self) -> Vec<MissedExpectation> {
        self.events.lock().unwrap().clone()
    }

    /// Number of events reported so far.
    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Whether nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discard collected events.
    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl MissedRaceSink for CollectingSink {
    fn report_missed(&self, event: &MissedExpectation) {
        self.events.lock().unwrap().push(event.clone());
    }
}
