//! Tower middleware for dynamo-session.
//!
//! [`SessionLayer`] opens the session for each request, hands it to the
//! inner service as a [`SessionHandle`] request extension, and saves it into
//! the response afterwards.
//!
//! ```rust,ignore
//! use dynamo_session_tower::{SessionHandle, SessionLayer};
//! use tower::{ServiceBuilder, service_fn};
//!
//! let app = service_fn(|req: http::Request<()>| async move {
//!     let session = req.extensions().get::<SessionHandle>().unwrap();
//!     session.insert("seen", true)?;
//!     Ok::<_, dynamo_session_core::SessionError>(http::Response::new(()))
//! });
//!
//! let service = ServiceBuilder::new()
//!     .layer(SessionLayer::new(sessions))
//!     .service(app);
//! ```

mod handle;
mod service;

pub use handle::SessionHandle;
pub use service::{SessionLayer, SessionService};
