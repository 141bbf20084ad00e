use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::interview::models::SessionState;

/// Live sessions keyed by id. Each session sits behind its own mutex so a
/// turn has exclusive access to it while other sessions proceed.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<Mutex<SessionState>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Returns the registered session, inserting `state` if the id is new.
    pub async fn get_or_insert(&self, state: SessionState) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(state.session_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(state))),
        )
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
