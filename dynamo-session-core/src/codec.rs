//! Session payload encoding.

use crate::error::{SessionError, SessionResult};
use crate::session::SessionData;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Converts session data to and from the opaque payload kept in the store.
pub trait SessionCodec: Send + Sync {
    /// Encode session data into a store payload.
    fn encode(&self, data: &SessionData) -> SessionResult<String>;

    /// Decode a store payload.
    ///
    /// A missing or empty payload is a valid, empty session and must decode to
    /// an empty map.
    fn decode(&self, payload: Option<&str>) -> SessionResult<SessionData>;
}

/// JSON, wrapped in standard base64 so the store only ever sees ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SessionCodec for JsonCodec {
    fn encode(&self, data: &SessionData) -> SessionResult<String> {
        let json = serde_json::to_vec(data).map_err(|e| SessionError::Serialization(e.to_string()))?;
        Ok(STANDARD.encode(json))
    }

    fn decode(&self, payload: Option<&str>) -> SessionResult<SessionData> {
        let payload = match payload.map(str::trim) {
            None | Some("") => return Ok(SessionData::new()),
            Some(payload) => payload,
        };

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| SessionError::Deserialization(format!("invalid base64: {e}")))?;

        serde_json::from_slice(&bytes).map_err(|e| SessionError::Deserialization(e.to_string()))
    }
}
