//! Cookie-identified, in-process session storage.
//!
//! Sessions hold small JSON values keyed by name and expire after a fixed
//! lifetime that is refreshed on every write. The receipt handoff uses
//! [`SessionStore::take_once`] so a staged receipt can only be displayed once.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::{AppError, Result};
use crate::models::Receipt;

/// Session key for receipts staged by the order workflow.
pub const RECEIPT_KEY: &str = "receipt";
/// Session key for receipts staged by the virtual terminal.
pub const TERMINAL_RECEIPT_KEY: &str = "terminal_receipt";

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Default)]
struct SessionData {
    values: HashMap<String, serde_json::Value>,
    expires_at: i64,
}

/// Session values are written by the server, so a codec failure is ours.
fn session_value_error(e: serde_json::Error) -> AppError {
    AppError::Internal(format!("Session value could not be encoded: {}", e))
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SessionData>>>,
    lifetime_secs: i64,
}

impl SessionStore {
    pub fn new(lifetime_secs: i64) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            lifetime_secs,
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SessionId, SessionData>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Live session data, dropping it first if it has expired.
    fn live<'a>(
        sessions: &'a mut HashMap<SessionId, SessionData>,
        id: &SessionId,
        now: i64,
    ) -> Option<&'a mut SessionData> {
        if sessions.get(id).is_some_and(|s| s.expires_at <= now) {
            sessions.remove(id);
        }
        sessions.get_mut(id)
    }

    /// Start a new, empty session and return its id.
    pub fn create(&self) -> SessionId {
        let id = SessionId::generate();
        let expires_at = Utc::now().timestamp() + self.lifetime_secs;
        self.lock().insert(
            id.clone(),
            SessionData {
                values: HashMap::new(),
                expires_at,
            },
        );
        id
    }

    /// Whether `id` names a live session this store issued.
    pub fn contains(&self, id: &SessionId) -> bool {
        let now = Utc::now().timestamp();
        let mut sessions = self.lock();
        Self::live(&mut sessions, id, now).is_some()
    }

    /// Store `value` under `key`, replacing any previous value.
    pub fn put<T: Serialize>(&self, id: &SessionId, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(session_value_error)?;
        let now = Utc::now().timestamp();
        let mut sessions = self.lock();
        if Self::live(&mut sessions, id, now).is_none() {
            sessions.insert(id.clone(), SessionData::default());
        }
        if let Some(session) = sessions.get_mut(id) {
            session.values.insert(key.to_string(), value);
            session.expires_at = now + self.lifetime_secs;
        }
        Ok(())
    }

    pub fn get<T: DeserializeOwned>(&self, id: &SessionId, key: &str) -> Result<Option<T>> {
        let now = Utc::now().timestamp();
        let mut sessions = self.lock();
        let value = Self::live(&mut sessions, id, now).and_then(|s| s.values.get(key).cloned());
        drop(sessions);
        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(session_value_error)
    }

    /// Remove `key`, returning whether it was present.
    pub fn remove(&self, id: &SessionId, key: &str) -> bool {
        let now = Utc::now().timestamp();
        let mut sessions = self.lock();
        Self::live(&mut sessions, id, now)
            .and_then(|s| s.values.remove(key))
            .is_some()
    }

    /// Return the value under `key` and remove it in the same critical section.
    pub fn take_once<T: DeserializeOwned>(&self, id: &SessionId, key: &str) -> Result<Option<T>> {
        let now = Utc::now().timestamp();
        let value = {
            let mut sessions = self.lock();
            Self::live(&mut sessions, id, now).and_then(|s| s.values.remove(key))
        };
        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(session_value_error)
    }

    /// Drop every expired session. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receipt handoff bound to one session.
    pub fn handoff(&self, id: &SessionId) -> ReceiptHandoff {
        ReceiptHandoff {
            store: self.clone(),
            session: id.clone(),
        }
    }
}

/// Single-read staging area for a session's receipt.
pub struct ReceiptHandoff {
    store: SessionStore,
    session: SessionId,
}

impl ReceiptHandoff {
    pub fn put(&self, key: &str, receipt: &Receipt) -> Result<()> {
        self.store.put(&self.session, key, receipt)
    }

    pub fn take_once(&self, key: &str) -> Result<Option<Receipt>> {
        self.store.take_once(&self.session, key)
    }
}
