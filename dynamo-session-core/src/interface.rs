//! Open/save orchestration bound to the request/response cycle.

use crate::backend::KeyValueBackend;
use crate::codec::{JsonCodec, SessionCodec};
use crate::config::{SessionConfig, TransportMode};
use crate::error::{BackendError, BackendResult, SessionResult};
use crate::http::{SessionRequest, SessionResponse};
use crate::session::{Session, generate_session_id};
use crate::transport::IdentifierTransport;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

/// What [`SessionInterface::save`] did with a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Payload written and identifier sent to the client.
    Persisted,
    /// No backend call was needed. `emitted` tells whether the identifier was
    /// still sent.
    Unchanged { emitted: bool },
    /// The stored session was deleted and the client told to forget it.
    Deleted,
    /// The delete call failed; the client was still told to forget the id.
    DeleteFailed(String),
    /// Nothing to store and nothing to send (new session left empty).
    Skipped,
    /// Encoding or the write failed; the identifier was not sent.
    Failed(String),
}

/// Binds session persistence to the request/response lifecycle.
///
/// The host calls [`open`](Self::open) when a request arrives and
/// [`save`](Self::save) before the response leaves. Neither call ever fails:
/// store problems are logged and degrade to a fresh or unsaved session, so a
/// session-store outage never turns into a failed response.
///
/// Cloning is cheap and clones share the backend, so one instance can serve
/// every concurrent request.
///
/// # Examples
///
/// ```
/// use dynamo_session_core::{MemoryBackend, SessionConfig, SessionInterface};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SessionConfig::new("sessions").with_header_transport();
/// let sessions = SessionInterface::new(config, Arc::new(MemoryBackend::new()))?;
///
/// let request = http::Request::builder().body(())?;
/// let mut session = sessions.open(&request).await;
/// session.insert("user_id", 42)?;
///
/// let mut response = http::Response::new(());
/// sessions.save(&session, &mut response).await;
/// assert_eq!(response.headers()["X-SessionId"], session.id());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SessionInterface {
    config: Arc<SessionConfig>,
    backend: Arc<dyn KeyValueBackend>,
    codec: Arc<dyn SessionCodec>,
    transport: IdentifierTransport,
}

impl std::fmt::Debug for SessionInterface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInterface")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("transport", &self.transport)
            .finish()
    }
}

impl SessionInterface {
    /// Create a session interface over `backend`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`](crate::SessionError::Config) when the
    /// configuration does not validate.
    pub fn new(config: SessionConfig, backend: Arc<dyn KeyValueBackend>) -> SessionResult<Self> {
        config.validate()?;
        let transport = IdentifierTransport::new(&config);

        Ok(Self {
            config: Arc::new(config),
            backend,
            codec: Arc::new(JsonCodec),
            transport,
        })
    }

    /// Replace the payload codec.
    pub fn with_codec<C: SessionCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The identifier transport.
    pub fn transport(&self) -> &IdentifierTransport {
        &self.transport
    }

    /// Resolve, fetch and hydrate the session for an inbound request.
    pub async fn open<R: SessionRequest + ?Sized>(&self, request: &R) -> Session {
        let permanent = self.config.permanent;

        let Some(id) = self.transport.resolve(request) else {
            let id = generate_session_id();
            debug!(session_id = %id, "No session identifier presented, starting a new session");
            return Session::fresh(id, permanent);
        };

        let fetched = self
            .bounded("get", self.backend.get(&id, self.config.consistent_read))
            .await;

        match fetched {
            Ok(Some(item)) if item.is_expired() => {
                debug!(session_id = %id, "Stored session is past its TTL");
                Session::fresh(id, permanent)
            }
            Ok(Some(item)) => match self.codec.decode(item.data.as_deref()) {
                Ok(data) => {
                    debug!(session_id = %id, keys = data.len(), "Session hydrated");
                    Session::hydrated(id, data, permanent)
                }
                Err(e) => {
                    warn!(session_id = %id, error = %e, "Discarding undecodable session payload");
                    Session::fresh(id, permanent)
                }
            },
            Ok(None) => {
                debug!(session_id = %id, "Session not found, starting a new session");
                Session::fresh(id, permanent)
            }
            Err(e) => {
                warn!(
                    session_id = %id,
                    backend = self.backend.name(),
                    error = %e,
                    "Session read failed, starting a new session"
                );
                Session::fresh(id, permanent)
            }
        }
    }

    /// Write the session back and propagate its identifier.
    pub async fn save<R: SessionResponse + ?Sized>(
        &self,
        session: &Session,
        response: &mut R,
    ) -> SaveOutcome {
        let id = session.id();

        if session.is_empty() {
            if session.is_new() {
                return SaveOutcome::Skipped;
            }
            if !session.is_data_modified() {
                return self.reemit(session, response);
            }

            let deleted = self.bounded("delete", self.backend.delete(id)).await;
            self.transport.clear(response);
            return match deleted {
                Ok(()) => {
                    debug!(session_id = %id, "Session cleared and deleted");
                    SaveOutcome::Deleted
                }
                Err(e) => {
                    warn!(
                        session_id = %id,
                        backend = self.backend.name(),
                        error = %e,
                        "Session delete failed"
                    );
                    SaveOutcome::DeleteFailed(e.to_string())
                }
            };
        }

        if !session.is_modified() && !session.is_new() {
            return self.reemit(session, response);
        }

        let payload = match self.codec.encode(session.data()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(session_id = %id, error = %e, "Session could not be encoded");
                return SaveOutcome::Failed(e.to_string());
            }
        };

        let expires_at = chrono::Duration::from_std(self.config.ttl)
            .ok()
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        match self
            .bounded("put", self.backend.put(id, &payload, expires_at))
            .await
        {
            Ok(()) => {
                self.transport.emit(response, id, session.permanent());
                debug!(session_id = %id, "Session persisted");
                SaveOutcome::Persisted
            }
            Err(e) => {
                warn!(
                    session_id = %id,
                    backend = self.backend.name(),
                    error = %e,
                    "Session write failed, response continues without it"
                );
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    /// Send the identifier of a session that needs no backend call.
    ///
    /// Header mode always answers with the header. Cookie mode re-issues the
    /// cookie when the lifetime hint changed, or for permanent sessions when
    /// `refresh_each_request` is set.
    fn reemit<R: SessionResponse + ?Sized>(
        &self,
        session: &Session,
        response: &mut R,
    ) -> SaveOutcome {
        let emitted = match self.transport.mode() {
            TransportMode::Header => true,
            TransportMode::Cookie => {
                session.is_modified()
                    || (session.permanent() && self.config.cookie.refresh_each_request)
            }
        };
        if emitted {
            self.transport.emit(response, session.id(), session.permanent());
        }
        SaveOutcome::Unchanged { emitted }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = BackendResult<T>>,
    ) -> BackendResult<T> {
        tokio::time::timeout(self.config.backend_timeout, call)
            .await
            .unwrap_or(Err(BackendError::Timeout(operation)))
    }
}
