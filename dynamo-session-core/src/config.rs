//! Session configuration.

use crate::error::{SessionError, SessionResult};
use cookie::SameSite;
use std::time::Duration;

/// How the session identifier travels between client and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Identifier is carried in the host's session cookie.
    #[default]
    Cookie,
    /// Identifier is carried in a custom request/response header.
    Header,
}

/// Session cookie settings, used only in [`TransportMode::Cookie`].
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name
    pub name: String,
    /// Cookie domain
    pub domain: Option<String>,
    /// Cookie path
    pub path: String,
    /// Cookie secure flag (HTTPS only)
    pub secure: bool,
    /// Cookie HttpOnly flag
    pub http_only: bool,
    /// Cookie SameSite policy
    pub same_site: SameSite,
    /// Client-side lifetime of a permanent session cookie
    pub lifetime: Duration,
    /// Re-issue the cookie on every response, even when the session is unchanged
    pub refresh_each_request: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            domain: None,
            path: "/".to_string(),
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            lifetime: Duration::from_secs(86400 * 31), // 31 days
            refresh_each_request: true,
        }
    }
}

/// Session configuration.
///
/// Built once at startup and handed to
/// [`SessionInterface::new`](crate::SessionInterface::new), which validates it.
/// Nothing reads configuration from the environment after that point.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Store table name
    pub table_name: String,
    /// Store region (SDK default chain when unset)
    pub region: Option<String>,
    /// Store endpoint override (LocalStack, DynamoDB Local, ...)
    pub endpoint_url: Option<String>,
    /// Server-side time-to-live, renewed on every write-back
    pub ttl: Duration,
    /// Use strongly consistent reads
    pub consistent_read: bool,
    /// Identifier transport
    pub transport: TransportMode,
    /// Header carrying the identifier in header mode
    pub header_name: String,
    /// Default `permanent` flag for new and hydrated sessions
    pub permanent: bool,
    /// Upper bound for any single backend call
    pub backend_timeout: Duration,
    /// Cookie settings
    pub cookie: CookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            table_name: "sessions".to_string(),
            region: None,
            endpoint_url: None,
            ttl: Duration::from_secs(86400), // 24 hours
            consistent_read: false,
            transport: TransportMode::Cookie,
            header_name: "X-SessionId".to_string(),
            permanent: true,
            backend_timeout: Duration::from_secs(5),
            cookie: CookieConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Create a configuration for the given table with default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use dynamo_session_core::SessionConfig;
    ///
    /// let config = SessionConfig::new("app-sessions").with_header_transport();
    /// assert_eq!(config.table_name, "app-sessions");
    /// ```
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            ..Default::default()
        }
    }

    /// Load configuration from process environment variables.
    ///
    /// Unset variables keep their defaults. See [`from_lookup`](Self::from_lookup)
    /// for the recognised names.
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Recognised keys:
    ///
    /// | Key | Field |
    /// |---|---|
    /// | `SESSION_DYNAMODB_TABLE` | `table_name` |
    /// | `SESSION_DYNAMODB_REGION` | `region` |
    /// | `SESSION_DYNAMODB_ENDPOINT` | `endpoint_url` |
    /// | `SESSION_DYNAMODB_TTL` | `ttl` (seconds) |
    /// | `SESSION_DYNAMODB_CONSISTENT_READ` | `consistent_read` |
    /// | `SESSION_DYNAMODB_USE_HEADER` | `transport` |
    /// | `SESSION_DYNAMODB_HEADER_NAME` | `header_name` |
    /// | `SESSION_DYNAMODB_PERMANENT` | `permanent` |
    /// | `SESSION_DYNAMODB_TIMEOUT_MS` | `backend_timeout` (milliseconds) |
    /// | `SESSION_COOKIE_NAME` | `cookie.name` |
    /// | `SESSION_COOKIE_DOMAIN` | `cookie.domain` |
    /// | `SESSION_COOKIE_PATH` | `cookie.path` |
    /// | `SESSION_COOKIE_SECURE` | `cookie.secure` |
    /// | `SESSION_COOKIE_HTTPONLY` | `cookie.http_only` |
    /// | `SESSION_COOKIE_SAMESITE` | `cookie.same_site` (`Strict`, `Lax`, `None`) |
    /// | `PERMANENT_SESSION_LIFETIME` | `cookie.lifetime` (seconds) |
    /// | `SESSION_REFRESH_EACH_REQUEST` | `cookie.refresh_each_request` |
    pub fn from_lookup<F>(lookup: F) -> SessionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(table) = lookup("SESSION_DYNAMODB_TABLE") {
            config.table_name = table;
        }
        config.region = lookup("SESSION_DYNAMODB_REGION");
        config.endpoint_url = lookup("SESSION_DYNAMODB_ENDPOINT");

        if let Some(ttl) = lookup("SESSION_DYNAMODB_TTL") {
            config.ttl = Duration::from_secs(parse_number("SESSION_DYNAMODB_TTL", &ttl)?);
        }
        if let Some(v) = lookup("SESSION_DYNAMODB_CONSISTENT_READ") {
            config.consistent_read = parse_flag("SESSION_DYNAMODB_CONSISTENT_READ", &v)?;
        }
        if let Some(v) = lookup("SESSION_DYNAMODB_USE_HEADER") {
            if parse_flag("SESSION_DYNAMODB_USE_HEADER", &v)? {
                config.transport = TransportMode::Header;
            }
        }
        if let Some(name) = lookup("SESSION_DYNAMODB_HEADER_NAME") {
            config.header_name = name;
        }
        if let Some(v) = lookup("SESSION_DYNAMODB_PERMANENT") {
            config.permanent = parse_flag("SESSION_DYNAMODB_PERMANENT", &v)?;
        }
        if let Some(ms) = lookup("SESSION_DYNAMODB_TIMEOUT_MS") {
            config.backend_timeout =
                Duration::from_millis(parse_number("SESSION_DYNAMODB_TIMEOUT_MS", &ms)?);
        }

        if let Some(name) = lookup("SESSION_COOKIE_NAME") {
            config.cookie.name = name;
        }
        config.cookie.domain = lookup("SESSION_COOKIE_DOMAIN");
        if let Some(path) = lookup("SESSION_COOKIE_PATH") {
            config.cookie.path = path;
        }
        if let Some(v) = lookup("SESSION_COOKIE_SECURE") {
            config.cookie.secure = parse_flag("SESSION_COOKIE_SECURE", &v)?;
        }
        if let Some(v) = lookup("SESSION_COOKIE_HTTPONLY") {
            config.cookie.http_only = parse_flag("SESSION_COOKIE_HTTPONLY", &v)?;
        }
        if let Some(v) = lookup("SESSION_COOKIE_SAMESITE") {
            config.cookie.same_site = parse_same_site(&v)?;
        }
        if let Some(secs) = lookup("PERMANENT_SESSION_LIFETIME") {
            config.cookie.lifetime =
                Duration::from_secs(parse_number("PERMANENT_SESSION_LIFETIME", &secs)?);
        }
        if let Some(v) = lookup("SESSION_REFRESH_EACH_REQUEST") {
            config.cookie.refresh_each_request = parse_flag("SESSION_REFRESH_EACH_REQUEST", &v)?;
        }

        Ok(config)
    }

    /// Check the configuration for values the session interface cannot work with.
    pub fn validate(&self) -> SessionResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(SessionError::Config("table name must not be empty".to_string()));
        }
        if self.ttl.is_zero() {
            return Err(SessionError::Config("ttl must be greater than zero".to_string()));
        }
        if self.backend_timeout.is_zero() {
            return Err(SessionError::Config(
                "backend timeout must be greater than zero".to_string(),
            ));
        }
        if http::HeaderName::from_bytes(self.header_name.as_bytes()).is_err() {
            return Err(SessionError::Config(format!(
                "'{}' is not a valid header name",
                self.header_name
            )));
        }
        if !is_cookie_token(&self.cookie.name) {
            return Err(SessionError::Config(format!(
                "'{}' is not a valid cookie name",
                self.cookie.name
            )));
        }
        Ok(())
    }

    /// Set the store table name.
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Set the store region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom store endpoint URL.
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set the server-side session TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable strongly consistent reads.
    pub fn with_consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = consistent_read;
        self
    }

    /// Carry the identifier in the configured header instead of a cookie.
    pub fn with_header_transport(mut self) -> Self {
        self.transport = TransportMode::Header;
        self
    }

    /// Set the identifier transport.
    pub fn with_transport(mut self, transport: TransportMode) -> Self {
        self.transport = transport;
        self
    }

    /// Set the identifier header name.
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// Set the default `permanent` flag.
    pub fn with_permanent(mut self, permanent: bool) -> Self {
        self.permanent = permanent;
        self
    }

    /// Set the per-call backend timeout.
    pub fn with_backend_timeout(mut self, timeout: Duration) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Replace the cookie settings.
    pub fn with_cookie(mut self, cookie: CookieConfig) -> Self {
        self.cookie = cookie;
        self
    }

    /// Set the session cookie name.
    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie.name = name.into();
        self
    }
}

fn parse_flag(key: &str, value: &str) -> SessionResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SessionError::Config(format!(
            "{key}: expected a boolean, got '{other}'"
        ))),
    }
}

fn parse_number(key: &str, value: &str) -> SessionResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|_| SessionError::Config(format!("{key}: expected an integer, got '{value}'")))
}

fn parse_same_site(value: &str) -> SessionResult<SameSite> {
    match value.trim().to_lowercase().as_str() {
        "strict" => Ok(SameSite::Strict),
        "lax" => Ok(SameSite::Lax),
        "none" => Ok(SameSite::None),
        other => Err(SessionError::Config(format!(
            "SESSION_COOKIE_SAMESITE: expected Strict, Lax or None, got '{other}'"
        ))),
    }
}

// RFC 6265 cookie-name: an RFC 2616 token.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.table_name, "sessions");
        assert_eq!(config.header_name, "X-SessionId");
        assert_eq!(config.transport, TransportMode::Cookie);
        assert!(!config.consistent_read);
        assert!(config.permanent);
        assert_eq!(config.cookie.name, "session");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = SessionConfig::new("test-table")
            .with_region("us-compton-2")
            .with_endpoint_url("http://test-ep")
            .with_ttl(Duration::from_secs(5963))
            .with_header_transport()
            .with_header_name("test-header")
            .with_consistent_read(true)
            .with_permanent(false);

        assert_eq!(config.table_name, "test-table");
        assert_eq!(config.region.as_deref(), Some("us-compton-2"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://test-ep"));
        assert_eq!(config.ttl, Duration::from_secs(5963));
        assert_eq!(config.transport, TransportMode::Header);
        assert_eq!(config.header_name, "test-header");
        assert!(config.consistent_read);
        assert!(!config.permanent);
    }

    #[test]
    fn test_from_lookup() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("SESSION_DYNAMODB_REGION", "bogus-region"),
            ("SESSION_DYNAMODB_ENDPOINT", "http://bogus:1234"),
            ("SESSION_DYNAMODB_USE_HEADER", "True"),
            ("SESSION_DYNAMODB_CONSISTENT_READ", "1"),
            ("SESSION_DYNAMODB_TTL", "600"),
            ("SESSION_DYNAMODB_TIMEOUT_MS", "250"),
            ("SESSION_COOKIE_SAMESITE", "strict"),
            ("SESSION_REFRESH_EACH_REQUEST", "false"),
        ]))
        .unwrap();

        assert_eq!(config.region.as_deref(), Some("bogus-region"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://bogus:1234"));
        assert_eq!(config.transport, TransportMode::Header);
        assert!(config.consistent_read);
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.backend_timeout, Duration::from_millis(250));
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert!(!config.cookie.refresh_each_request);
        // Untouched keys keep their defaults
        assert_eq!(config.table_name, "sessions");
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        let err = SessionConfig::from_lookup(lookup_from(&[("SESSION_DYNAMODB_TTL", "soon")]));
        assert!(matches!(err, Err(SessionError::Config(_))));

        let err = SessionConfig::from_lookup(lookup_from(&[(
            "SESSION_DYNAMODB_CONSISTENT_READ",
            "maybe",
        )]));
        assert!(matches!(err, Err(SessionError::Config(_))));
    }

    #[test]
    fn test_validate() {
        assert!(SessionConfig::new("").validate().is_err());
        assert!(
            SessionConfig::default()
                .with_ttl(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::default()
                .with_header_name("bad header")
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::default()
                .with_cookie_name("a;b")
                .validate()
                .is_err()
        );
        assert!(
            SessionConfig::default()
                .with_backend_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }
}
