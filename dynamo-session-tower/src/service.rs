//! Layer and service running open/save around an inner service.

use crate::handle::SessionHandle;
use dynamo_session_core::SessionInterface;
use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower_service::Service;
use tracing::debug;

/// Layer that gives every request a session.
///
/// ```rust,ignore
/// use dynamo_session_tower::SessionLayer;
/// use tower::ServiceBuilder;
///
/// let service = ServiceBuilder::new()
///     .layer(SessionLayer::new(sessions))
///     .service(app);
/// ```
#[derive(Debug, Clone)]
pub struct SessionLayer {
    sessions: SessionInterface,
}

impl SessionLayer {
    /// Create a layer backed by `sessions`.
    pub fn new(sessions: SessionInterface) -> Self {
        Self { sessions }
    }
}

impl<S> tower::Layer<S> for SessionLayer {
    type Service = SessionService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SessionService::new(inner, self.sessions.clone())
    }
}

/// Service created by [`SessionLayer`].
///
/// Per request: open the session, expose it as a [`SessionHandle`] request
/// extension, call the inner service, then save the session into the
/// response. Errors from the inner service pass through untouched and skip
/// the save.
#[derive(Debug, Clone)]
pub struct SessionService<S> {
    inner: S,
    sessions: SessionInterface,
}

impl<S> SessionService<S> {
    /// Wrap `inner`.
    pub fn new(inner: S, sessions: SessionInterface) -> Self {
        Self { inner, sessions }
    }

    /// The wrapped service.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for SessionService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; keep it and call the one that was polled.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let sessions = self.sessions.clone();

        Box::pin(async move {
            let session = sessions.open(req.headers()).await;
            let handle = SessionHandle::new(session);
            req.extensions_mut().insert(handle.clone());

            let mut response = inner.call(req).await?;

            let session = handle.snapshot();
            let outcome = sessions.save(&session, &mut response).await;
            debug!(session_id = session.id(), ?outcome, "Session save finished");

            Ok(response)
        })
    }
}
