//! Session identifier transport (header or cookie).

use crate::config::{CookieConfig, SessionConfig, TransportMode};
use crate::http::{SessionRequest, SessionResponse};
use cookie::Cookie;
use cookie::time::Duration as CookieDuration;

/// Longest identifier accepted from a client.
pub const MAX_ID_LEN: usize = 128;

/// Moves the session identifier between requests and responses.
///
/// In header mode only the configured header is ever read or written; in
/// cookie mode only the configured cookie is. A response never receives both.
#[derive(Debug, Clone)]
pub struct IdentifierTransport {
    mode: TransportMode,
    header_name: String,
    cookie: CookieConfig,
}

impl IdentifierTransport {
    /// Create a transport from the session configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            mode: config.transport,
            header_name: config.header_name.clone(),
            cookie: config.cookie.clone(),
        }
    }

    /// Configured transport mode.
    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Read the identifier presented by the client.
    ///
    /// Missing or malformed identifiers yield `None`, which the caller treats
    /// as a brand-new session.
    pub fn resolve<R: SessionRequest + ?Sized>(&self, request: &R) -> Option<String> {
        let id = match self.mode {
            TransportMode::Header => request.header(&self.header_name).map(str::to_string),
            TransportMode::Cookie => request.cookie(&self.cookie.name),
        }?;

        if is_valid_id(&id) {
            Some(id)
        } else {
            tracing::debug!(length = id.len(), "Ignoring malformed session identifier");
            None
        }
    }

    /// Write the identifier to the response.
    ///
    /// `permanent` controls the cookie's Max-Age; it has no effect in header
    /// mode.
    pub fn emit<R: SessionResponse + ?Sized>(&self, response: &mut R, id: &str, permanent: bool) {
        match self.mode {
            TransportMode::Header => response.set_header(&self.header_name, id),
            TransportMode::Cookie => response.append_cookie(self.session_cookie(id, permanent)),
        }
    }

    /// Tell the client to forget its identifier.
    ///
    /// Cookie mode sends a removal cookie. Header mode has nothing to revoke
    /// and writes nothing.
    pub fn clear<R: SessionResponse + ?Sized>(&self, response: &mut R) {
        if self.mode == TransportMode::Cookie {
            let mut cookie = self.session_cookie("", false);
            cookie.make_removal();
            response.append_cookie(cookie);
        }
    }

    fn session_cookie(&self, id: &str, permanent: bool) -> Cookie<'static> {
        let mut builder = Cookie::build((self.cookie.name.clone(), id.to_string()))
            .path(self.cookie.path.clone())
            .secure(self.cookie.secure)
            .http_only(self.cookie.http_only)
            .same_site(self.cookie.same_site);

        if let Some(ref domain) = self.cookie.domain {
            builder = builder.domain(domain.clone());
        }

        if permanent {
            let secs = i64::try_from(self.cookie.lifetime.as_secs()).unwrap_or(i64::MAX);
            builder = builder.max_age(CookieDuration::seconds(secs));
        }

        builder.build()
    }
}

/// Whether a client-supplied identifier is safe to use as a store key and to
/// echo back in a header or cookie.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~'))
}
