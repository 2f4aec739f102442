//! Request/response seams between the session interface and the host framework.

use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Request, Response};

/// Inbound side of the host framework, as seen by the session interface.
pub trait SessionRequest {
    /// Value of the named request header, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Value of the named request cookie.
    fn cookie(&self, name: &str) -> Option<String>;
}

/// Outbound side of the host framework, as seen by the session interface.
pub trait SessionResponse {
    /// Set a response header, replacing any previous value.
    fn set_header(&mut self, name: &str, value: &str);

    /// Append a `Set-Cookie` header.
    fn append_cookie(&mut self, cookie: Cookie<'_>);
}

impl SessionRequest for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }
}

impl SessionResponse for HeaderMap {
    fn set_header(&mut self, name: &str, value: &str) {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.insert(name, value);
            }
            _ => tracing::warn!(header = name, "Dropping session header with invalid name or value"),
        }
    }

    fn append_cookie(&mut self, cookie: Cookie<'_>) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                self.append(SET_COOKIE, value);
            }
            Err(_) => tracing::warn!(cookie = cookie.name(), "Dropping unencodable session cookie"),
        }
    }
}

impl<B> SessionRequest for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers().cookie(name)
    }
}

impl SessionRequest for http::request::Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }

    fn cookie(&self, name: &str) -> Option<String> {
        self.headers.cookie(name)
    }
}

impl<B> SessionResponse for Response<B> {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers_mut().set_header(name, value);
    }

    fn append_cookie(&mut self, cookie: Cookie<'_>) {
        self.headers_mut().append_cookie(cookie);
    }
}

impl SessionResponse for http::response::Parts {
    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.set_header(name, value);
    }

    fn append_cookie(&mut self, cookie: Cookie<'_>) {
        self.headers.append_cookie(cookie);
    }
}
