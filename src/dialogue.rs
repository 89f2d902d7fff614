//! Oracle dialogue module for per-chat conversation state.

use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

use crate::draw_history::DrawHistory;
use crate::location::LocationId;

/// Conversation state of one chat
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current location, `None` until the user enters the conversation
    pub location: Option<LocationId>,
    /// Recently drawn cards, created on the first draw
    pub history: Option<DrawHistory>,
}

impl SessionState {
    pub fn at(location: LocationId) -> Self {
        Self {
            location: Some(location),
            history: None,
        }
    }

    /// Draw history of this session, created with `capacity` on first use
    pub fn history_mut(&mut self, capacity: usize) -> &mut DrawHistory {
        self.history
            .get_or_insert_with(|| DrawHistory::with_capacity(capacity))
    }
}

/// Type alias for our oracle dialogue
pub type OracleDialogue = Dialogue<SessionState, InMemStorage<SessionState>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_is_created_lazily() {
        let mut state = SessionState::default();
        assert!(state.history.is_none());

        state.history_mut(3).record("Русалка");
        state.history_mut(10).record("Лысая гора");

        let history = state.history.as_ref().unwrap();
        assert_eq!(history.capacity(), 3);
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_session_starts_outside_conversation() {
        let state = SessionState::default();
        assert_eq!(state.location, None);
        assert_eq!(SessionState::at(LocationId(4)).location, Some(LocationId(4)));
    }
}
