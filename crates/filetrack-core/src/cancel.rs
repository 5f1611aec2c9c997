//! Cooperative cancellation and time budgets.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Why a scan or search stopped before finishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// The shared gate was signaled.
    Cancelled,
    /// The wall-clock budget ran out.
    TimedOut,
}

/// Shared stop signal for in-flight scans and searches.
///
/// Clones share state, so one handle can be given to a UI thread or signal
/// handler while the engine keeps another.
#[derive(Debug, Clone, Default)]
pub struct CancellationGate {
    cancelled: Arc<AtomicBool>,
}

impl CancellationGate {
    /// Create a new gate (not signaled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal every holder of this gate to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear the signal so the gate can be reused for the next call.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Start a checkpoint with an optional time budget measured from now.
    ///
    /// A budget too large to represent as an instant means no deadline.
    pub fn checkpoint(&self, budget: Option<Duration>) -> Checkpoint {
        Checkpoint {
            gate: self.clone(),
            deadline: budget.and_then(|budget| Instant::now().checked_add(budget)),
        }
    }
}

/// A gate paired with the deadline of one call.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    gate: CancellationGate,
    deadline: Option<Instant>,
}

impl Checkpoint {
    /// Return the reason to stop, if any. Cancellation wins over timeout.
    pub fn check(&self) -> Option<StopReason> {
        if self.gate.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::TimedOut),
            _ => None,
        }
    }

    /// Check whether work should stop.
    pub fn should_stop(&self) -> bool {
        self.check().is_some()
    }
}
