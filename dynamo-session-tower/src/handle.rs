//! Request-scoped session handle.

use dynamo_session_core::{Session, SessionResult};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Shared access to the session of the current request.
///
/// [`SessionService`](crate::SessionService) inserts one into the request
/// extensions before calling the inner service and saves whatever state it
/// holds once the inner service has produced a response. Clones share the
/// same session.
///
/// ```
/// use dynamo_session_core::Session;
/// use dynamo_session_tower::SessionHandle;
///
/// let handle = SessionHandle::new(Session::fresh("abc", true));
/// handle.insert("visits", 1).unwrap();
/// assert_eq!(handle.get::<u32>("visits"), Some(1));
/// assert!(handle.is_modified());
/// ```
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    /// Wrap an opened session.
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> String {
        self.inner.lock().id().to_string()
    }

    /// Whether the session was created during this request.
    pub fn is_new(&self) -> bool {
        self.inner.lock().is_new()
    }

    /// Whether the session changed during this request.
    pub fn is_modified(&self) -> bool {
        self.inner.lock().is_modified()
    }

    /// Read a typed value.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.inner.lock().get(key)
    }

    /// Store a value.
    pub fn insert<T: Serialize>(&self, key: &str, value: T) -> SessionResult<()> {
        self.inner.lock().insert(key, value)
    }

    /// Remove a value.
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.lock().remove(key)
    }

    /// Drop all values. The stored session is deleted on save.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Set the client-side lifetime hint.
    pub fn set_permanent(&self, permanent: bool) {
        self.inner.lock().set_permanent(permanent);
    }

    /// Run `f` with exclusive access to the session.
    ///
    /// The lock is held for the duration of `f`; do not call back into the
    /// same handle from inside it.
    pub fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Copy of the current session state.
    pub fn snapshot(&self) -> Session {
        self.inner.lock().clone()
    }
}
