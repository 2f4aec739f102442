//! Server-side sessions for HTTP services, persisted in a key-value store.
//!
//! The [`SessionInterface`] runs once per request/response cycle:
//!
//! 1. [`open`](SessionInterface::open) resolves the session identifier from a
//!    request header or cookie, reads the stored payload and hydrates a
//!    [`Session`].
//! 2. Handler code reads and mutates the session like a map.
//! 3. [`save`](SessionInterface::save) writes modified sessions back with a
//!    fresh TTL, deletes cleared ones, and sends the identifier to the client.
//!
//! Storage goes through the [`KeyValueBackend`] trait. The DynamoDB adapter
//! lives in `dynamo-session-dynamodb`; [`MemoryBackend`] covers development
//! and tests.
//!
//! # Failure policy
//!
//! Session storage never fails a request. Read errors, timeouts and corrupt
//! payloads degrade to a fresh session; write and delete errors are logged and
//! the response goes out without the session being saved. Concurrent requests
//! for the same session race, and the last write wins.
//!
//! # Features
//!
//! - `testing` - [`testing::MockBackend`], a call-recording backend with
//!   failure injection
//!
//! # Example
//!
//! ```
//! use dynamo_session_core::{
//!     MemoryBackend, SaveOutcome, SessionConfig, SessionError, SessionInterface,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), SessionError> {
//! let config = SessionConfig::from_env()?.with_table_name("app-sessions");
//! let sessions = SessionInterface::new(config, Arc::new(MemoryBackend::new()))?;
//!
//! let request = http::Request::new(());
//! let mut session = sessions.open(&request).await;
//! session.insert("username", "alice")?;
//!
//! let mut response = http::Response::new(());
//! match sessions.save(&session, &mut response).await {
//!     SaveOutcome::Persisted => {}
//!     other => eprintln!("session not saved: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod interface;
pub mod session;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use crate::backend::{KeyValueBackend, MemoryBackend, StoredSession};
pub use crate::codec::{JsonCodec, SessionCodec};
pub use crate::config::{CookieConfig, SessionConfig, TransportMode};
pub use crate::error::{BackendError, BackendResult, SessionError, SessionResult};
pub use crate::http::{SessionRequest, SessionResponse};
pub use crate::interface::{SaveOutcome, SessionInterface};
pub use crate::session::{Session, SessionData, generate_session_id};
pub use crate::transport::IdentifierTransport;

pub use cookie::SameSite;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backend::{KeyValueBackend, MemoryBackend};
    pub use crate::config::{SessionConfig, TransportMode};
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::interface::{SaveOutcome, SessionInterface};
    pub use crate::session::Session;
}
