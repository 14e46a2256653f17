use deepsite_scanner::CrawlSession;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Shared, lockable reference to a stored session. The lock is held for the
/// duration of a focused crawl so one session is never crawled twice at once.
pub type SessionHandle = Arc<Mutex<CrawlSession>>;

/// Key-value storage of crawl sessions under opaque ids.
pub trait SessionStore: Send + Sync {
    fn create(&self, session: CrawlSession) -> String;
    fn get(&self, session_id: &str) -> Option<SessionHandle>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Sessions live until removed or the process exits.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self, session: CrawlSession) -> String {
        let session_id = Uuid::new_v4().to_string();
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.insert(session_id.clone(), Arc::new(Mutex::new(session)));
        session_id
    }

    fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(session_id)
            .cloned()
    }

    fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}
