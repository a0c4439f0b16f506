//! Workflow states and the status side channel.
//!
//! The orchestrator moves strictly forward through [`WorkflowState`] and
//! reports each transition to a [`StatusCallback`]. Status events are
//! advisory: they never carry the result, which is returned from the
//! workflow entry point itself.
//!
//! # Marshaling back to the interface
//!
//! When the workflow runs on a background task, callbacks fire on that
//! task. Interfaces that must only mutate their widgets from one thread
//! should not touch them inside the callback. Use [`ChannelStatus`] instead:
//! it forwards every event into a Tokio channel that the interface drains on
//! its own task (see [`crate::workflow::spawn`]).

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// The orchestrator's state machine.
///
/// `Idle → Parsing → Extracting → Prompting → AwaitingResponse →
/// Formatting → Done`, with any state able to jump to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkflowState {
    Idle,
    Parsing,
    Extracting,
    Prompting,
    AwaitingResponse,
    Formatting,
    Done,
    Failed,
}

impl WorkflowState {
    /// Human-readable status text for this state.
    pub fn status_message(self) -> &'static str {
        match self {
            WorkflowState::Idle => "Ready.",
            WorkflowState::Parsing => "Step 1/4: Parsing document...",
            WorkflowState::Extracting => "Step 1/4: Extracting text...",
            WorkflowState::Prompting => "Step 2/4: Building instruction...",
            WorkflowState::AwaitingResponse => {
                "Step 2/4: Asking the local LLM (this may take a moment)..."
            }
            WorkflowState::Formatting => "Step 3/4: Finalizing summary...",
            WorkflowState::Done => "Step 4/4: Done!",
            WorkflowState::Failed => "Failed.",
        }
    }

    /// `Done` and `Failed` end a run.
    pub fn is_terminal(self) -> bool {
        matches!(self, WorkflowState::Done | WorkflowState::Failed)
    }
}

/// Receives status events from a running workflow.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync` because the
/// workflow may run on a background task.
pub trait StatusCallback: Send + Sync {
    /// Called on every state transition, including the final one.
    fn on_state(&self, state: WorkflowState, message: &str) {
        let _ = (state, message);
    }

    /// Called for degraded-but-continuing conditions, e.g. a short native
    /// PDF text layer with no OCR engine available.
    fn on_warning(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation, the default when no callback is configured.
pub struct NoopStatus;

impl StatusCallback for NoopStatus {}

/// Convenience alias matching the type stored in
/// [`crate::config::SummarizerConfig`].
pub type SharedStatus = Arc<dyn StatusCallback>;

/// One event forwarded by [`ChannelStatus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    State {
        state: WorkflowState,
        message: String,
    },
    Warning(String),
}

/// Forwards status events into an unbounded channel.
///
/// Send errors are ignored: a dropped receiver only means nobody is
/// listening any more, which must not fail the run.
pub struct ChannelStatus {
    tx: UnboundedSender<StatusEvent>,
}

impl ChannelStatus {
    pub fn new(tx: UnboundedSender<StatusEvent>) -> Self {
        Self { tx }
    }
}

impl StatusCallback for ChannelStatus {
    fn on_state(&self, state: WorkflowState, message: &str) {
        let _ = self.tx.send(StatusEvent::State {
            state,
            message: message.to_string(),
        });
    }

    fn on_warning(&self, message: &str) {
        let _ = self.tx.send(StatusEvent::Warning(message.to_string()));
    }
}
