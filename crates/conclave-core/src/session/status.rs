//! Session status state machine.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a session.
///
/// Transitions are enforced by the orchestrator:
///
/// - Active -> WaitingForClarification | Completed | Stuck | Cancelled | Error
/// - WaitingForClarification -> Active | Cancelled
/// - Stuck | Interrupted | Error -> Active (resume)
/// - Completed and Cancelled accept no outbound transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The dispatch loop is (or may be) running.
    Active,
    /// A persona asked the user a question; the loop is paused.
    WaitingForClarification,
    /// The Coordinator delivered a final solution.
    Completed,
    /// The team gave up, or a loop-detection cap fired.
    Stuck,
    /// The user cancelled the session.
    Cancelled,
    /// An unexpected internal failure stopped the loop.
    Error,
    /// Stopped by external restart logic; only ever consumed via resume.
    Interrupted,
}

impl SessionStatus {
    /// States that accept no outbound transition at all.
    pub fn is_final(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// States `resume` accepts.
    pub fn is_resumable(&self) -> bool {
        matches!(
            self,
            SessionStatus::Stuck | SessionStatus::Interrupted | SessionStatus::Error
        )
    }

    /// States in which a persona is on deck (`current_persona` must be set).
    pub fn holds_persona(&self) -> bool {
        matches!(
            self,
            SessionStatus::Active | SessionStatus::WaitingForClarification
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionStatus::Active => "Active",
            SessionStatus::WaitingForClarification => "WaitingForClarification",
            SessionStatus::Completed => "Completed",
            SessionStatus::Stuck => "Stuck",
            SessionStatus::Cancelled => "Cancelled",
            SessionStatus::Error => "Error",
            SessionStatus::Interrupted => "Interrupted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_states() {
        assert!(SessionStatus::Completed.is_final());
        assert!(SessionStatus::Cancelled.is_final());
        assert!(!SessionStatus::Stuck.is_final());
        assert!(!SessionStatus::Error.is_final());
    }

    #[test]
    fn test_resumable_states() {
        assert!(SessionStatus::Stuck.is_resumable());
        assert!(SessionStatus::Interrupted.is_resumable());
        assert!(SessionStatus::Error.is_resumable());
        assert!(!SessionStatus::Active.is_resumable());
        assert!(!SessionStatus::Completed.is_resumable());
        assert!(!SessionStatus::WaitingForClarification.is_resumable());
    }
}
