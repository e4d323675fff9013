//! User feedback reporting.
//!
//! The session tells a [`FeedbackSink`] about every command outcome, e.g.
//! "Item deleted" / "Latte moved to the archive". Sinks are informational
//! only: nothing they do can change the outcome of a command.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

/// Receiver of human-readable command outcomes.
pub trait FeedbackSink {
    fn report_success(&mut self, title: &str, detail: &str);
    fn report_failure(&mut self, title: &str, detail: &str);
}

/// Discards all feedback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn report_success(&mut self, _title: &str, _detail: &str) {}
    fn report_failure(&mut self, _title: &str, _detail: &str) {}
}

/// Logs feedback through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FeedbackSink for TracingSink {
    fn report_success(&mut self, title: &str, detail: &str) {
        tracing::info!(title, detail, "command succeeded");
    }

    fn report_failure(&mut self, title: &str, detail: &str) {
        tracing::warn!(title, detail, "command failed");
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// Whether a recorded report was a success or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    Failure,
}

/// One recorded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub outcome: Outcome,
    pub title: String,
    pub detail: String,
}

/// Keeps every report in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    log: Rc<RefCell<Vec<Feedback>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything reported so far, oldest first.
    pub fn reports(&self) -> Vec<Feedback> {
        self.log.borrow().clone()
    }

    pub fn last(&self) -> Option<Feedback> {
        self.log.borrow().last().cloned()
    }

    pub fn failures(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|f| f.outcome == Outcome::Failure)
            .count()
    }

    fn push(&self, outcome: Outcome, title: &str, detail: &str) {
        self.log.borrow_mut().push(Feedback {
            outcome,
            title: title.to_owned(),
            detail: detail.to_owned(),
        });
    }
}

impl FeedbackSink for RecordingSink {
    fn report_success(&mut self, title: &str, detail: &str) {
        self.push(Outcome::Success, title, detail);
    }

    fn report_failure(&mut self, title: &str, detail: &str) {
        self.push(Outcome::Failure, title, detail);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
