//! Compensating actions for multi-step resource creation
//!
//! After each step that leaves a remote resource behind, the caller pushes
//! the action that would undo it. When a guarded step fails the stack is
//! unwound in reverse order. A failing undo is recorded and logged, and the
//! remaining undos still run; the error of the failed step is what the
//! caller sees.

use crate::reporter::Reporter;
use futures_util::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;

type UndoFn<'a, E> = Box<dyn FnOnce() -> BoxFuture<'a, Result<(), E>> + Send + 'a>;

struct UndoAction<'a, E> {
    description: String,
    run: UndoFn<'a, E>,
}

/// LIFO stack of compensating actions
pub struct UndoStack<'a, E> {
    actions: Vec<UndoAction<'a, E>>,
    reporter: Reporter,
}

impl<'a, E> UndoStack<'a, E>
where
    E: Display + Send + 'a,
{
    pub fn new(reporter: Reporter) -> Self {
        Self {
            actions: Vec::new(),
            reporter,
        }
    }

    /// Register the action undoing the step that just succeeded
    pub fn push<F, Fut>(&mut self, description: impl Into<String>, undo: F)
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<(), E>> + Send + 'a,
    {
        self.actions.push(UndoAction {
            description: description.into(),
            run: Box::new(move || undo().boxed()),
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Drop all registered actions; the steps so far are kept
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Run `step`; unwind the stack if it fails, then return its error
    pub async fn guard<T, Fut>(&mut self, step: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
    {
        match step.await {
            Ok(value) => Ok(value),
            Err(e) => {
                self.reporter.warn(&format!("step failed, rolling back: {}", e));
                let report = self.unwind().await;
                if !report.is_success() {
                    tracing::warn!(
                        failed = report.failed.len(),
                        "Rollback left resources behind"
                    );
                }
                Err(e)
            }
        }
    }

    /// Run every registered action, newest first
    pub async fn unwind(&mut self) -> RollbackReport {
        let mut report = RollbackReport::new();

        while let Some(action) = self.actions.pop() {
            self.reporter.pending(&format!("rollback: {}", action.description));
            match (action.run)().await {
                Ok(()) => {
                    self.reporter
                        .success(&format!("rollback: {}", action.description));
                    report.add_success(action.description);
                }
                Err(e) => {
                    self.reporter.warn(&format!(
                        "rollback failed: {}: {}",
                        action.description, e
                    ));
                    report.add_failure(action.description, e.to_string());
                }
            }
        }

        report
    }
}

/// Outcome of an unwind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RollbackReport {
    /// Actions that completed
    pub succeeded: Vec<UndoResult>,

    /// Actions that failed
    pub failed: Vec<UndoResult>,
}

impl RollbackReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn add_success(&mut self, description: String) {
        self.succeeded.push(UndoResult {
            description,
            error: None,
        });
    }

    pub fn add_failure(&mut self, description: String, error: String) {
        self.failed.push(UndoResult {
            description,
            error: Some(error),
        });
    }
}

/// Result of a single undo action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResult {
    pub description: String,
    pub error: Option<String>,
}
