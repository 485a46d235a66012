use std::sync::{Mutex, PoisonError};

use moneybird_core::SessionStore;
use moneybird_domain::{Result, SessionState};

/// Session store that lives as long as the client.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    state: Mutex<SessionState>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with previously persisted fields.
    #[must_use]
    pub fn with_state(state: SessionState) -> Self {
        Self { state: Mutex::new(state) }
    }

    /// Copy of the last saved state.
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<SessionState> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &SessionState) -> Result<()> {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_replace_the_stored_state() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), SessionState::default());

        let state = SessionState { access_token: Some("T".into()), ..SessionState::default() };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
    }
}
