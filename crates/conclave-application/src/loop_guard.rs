//! Delegation cycle detection.
//!
//! Tracks the (from, to, context) edges a session has emitted so the
//! dispatch loop can spot a persona pair bouncing the same task back and
//! forth. An edge counts as a repeat when the same pair occurred within the
//! last three turns and the payload is substantively the same: identical
//! after whitespace collapse, or normalized Levenshtein similarity of at
//! least 0.9.

use strsim::normalized_levenshtein;

use conclave_core::persona::PersonaRole;

/// How far back (in turns) a repeated edge still counts as a loop.
const EDGE_WINDOW_TURNS: u32 = 3;

/// Payload similarity threshold for the loop heuristic.
const SIMILARITY_THRESHOLD: f64 = 0.9;

/// One recorded delegation hand-off.
#[derive(Debug, Clone)]
struct DelegationEdge {
    turn: u32,
    from: PersonaRole,
    to: PersonaRole,
    signature: String,
}

/// Session-local record of delegation edges.
#[derive(Debug, Default)]
pub struct DelegationTracker {
    edges: Vec<DelegationEdge>,
}

impl DelegationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the edge repeats a recent, substantively identical
    /// hand-off. Call before `record` for the current turn.
    pub fn is_loop(&self, turn: u32, from: PersonaRole, to: PersonaRole, context: &str) -> bool {
        let signature = collapse(context);
        self.edges
            .iter()
            .filter(|edge| edge.from == from && edge.to == to)
            .filter(|edge| turn.saturating_sub(edge.turn) <= EDGE_WINDOW_TURNS)
            .any(|edge| similar(&edge.signature, &signature))
    }

    /// Records an emitted edge in the persona history.
    pub fn record(&mut self, turn: u32, from: PersonaRole, to: PersonaRole, context: &str) {
        self.edges.push(DelegationEdge {
            turn,
            from,
            to,
            signature: collapse(context),
        });
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn similar(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    normalized_levenshtein(a, b) >= SIMILARITY_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_payload_within_window_is_loop() {
        let mut tracker = DelegationTracker::new();
        tracker.record(1, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, "build it");
        assert!(tracker.is_loop(
            3,
            PersonaRole::Coordinator,
            PersonaRole::SeniorDeveloper,
            "build   it"
        ));
    }

    #[test]
    fn test_old_edge_outside_window_is_not_loop() {
        let mut tracker = DelegationTracker::new();
        tracker.record(1, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, "build it");
        assert!(!tracker.is_loop(
            5,
            PersonaRole::Coordinator,
            PersonaRole::SeniorDeveloper,
            "build it"
        ));
    }

    #[test]
    fn test_different_pair_is_not_loop() {
        let mut tracker = DelegationTracker::new();
        tracker.record(1, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, "build it");
        assert!(!tracker.is_loop(
            2,
            PersonaRole::Coordinator,
            PersonaRole::JuniorDeveloper,
            "build it"
        ));
    }

    #[test]
    fn test_near_identical_payload_is_loop() {
        let mut tracker = DelegationTracker::new();
        let context = "please implement the authentication endpoint for the API";
        let near = "please implement the authentication endpoint for the API.";
        tracker.record(1, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, context);
        assert!(tracker.is_loop(2, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, near));
    }

    #[test]
    fn test_substantively_different_payload_is_not_loop() {
        let mut tracker = DelegationTracker::new();
        tracker.record(1, PersonaRole::Coordinator, PersonaRole::SeniorDeveloper, "design the schema");
        assert!(!tracker.is_loop(
            2,
            PersonaRole::Coordinator,
            PersonaRole::SeniorDeveloper,
            "write the integration tests"
        ));
    }
}
