//! Request interception hooks.
//!
//! An override sees every GET or POST before the engine does. A hook that
//! claims the request takes ownership of the response callback and the
//! engine does nothing further: no pollset registration, no in-flight
//! state, no I/O. A hook that declines hands the callback back.

use std::sync::Arc;

use tokio::time::Instant;

use crate::client::request::Request;
use crate::client::response::Response;

/// Callback receiving the outcome of one request.
pub type ResponseCallback = Box<dyn FnOnce(Option<Response>) + Send + 'static>;

/// Result of offering a request to an override.
pub enum Intercept {
    /// The hook owns the callback and will invoke it.
    Handled,
    /// The engine should run the request with this callback.
    Declined(ResponseCallback),
}

impl std::fmt::Debug for Intercept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Intercept::Handled => f.write_str("Handled"),
            Intercept::Declined(_) => f.write_str("Declined"),
        }
    }
}

/// Interceptor for GET requests.
pub trait GetOverride: Send + Sync + 'static {
    fn intercept_get(
        &self,
        request: &Request,
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept;
}

impl<F> GetOverride for F
where
    F: Fn(&Request, Instant, ResponseCallback) -> Intercept + Send + Sync + 'static,
{
    fn intercept_get(
        &self,
        request: &Request,
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept {
        self(request, deadline, on_response)
    }
}

/// Interceptor for POST requests.
pub trait PostOverride: Send + Sync + 'static {
    fn intercept_post(
        &self,
        request: &Request,
        body: &[u8],
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept;
}

impl<F> PostOverride for F
where
    F: Fn(&Request, &[u8], Instant, ResponseCallback) -> Intercept + Send + Sync + 'static,
{
    fn intercept_post(
        &self,
        request: &Request,
        body: &[u8],
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept {
        self(request, body, deadline, on_response)
    }
}

/// The pair of hooks a client consults. Replaced as a unit.
#[derive(Clone, Default)]
pub struct Overrides {
    get: Option<Arc<dyn GetOverride>>,
    post: Option<Arc<dyn PostOverride>>,
}

impl Overrides {
    pub fn new(get: Option<Arc<dyn GetOverride>>, post: Option<Arc<dyn PostOverride>>) -> Self {
        Self { get, post }
    }

    /// No interception; every request goes to the network.
    pub fn none() -> Self {
        Self::default()
    }

    pub(crate) fn offer_get(
        &self,
        request: &Request,
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept {
        match &self.get {
            Some(hook) => hook.intercept_get(request, deadline, on_response),
            None => Intercept::Declined(on_response),
        }
    }

    pub(crate) fn offer_post(
        &self,
        request: &Request,
        body: &[u8],
        deadline: Instant,
        on_response: ResponseCallback,
    ) -> Intercept {
        match &self.post {
            Some(hook) => hook.intercept_post(request, body, deadline, on_response),
            None => Intercept::Declined(on_response),
        }
    }
}

impl std::fmt::Debug for Overrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overrides")
            .field("get", &self.get.is_some())
            .field("post", &self.post.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::sync::Mutex;

    #[test]
    fn test_empty_overrides_decline() {
        let overrides = Overrides::none();
        let request = Request::new("h", "/");
        let outcome = overrides.offer_get(&request, Instant::now(), Box::new(|_: Option<Response>| {}));
        assert!(matches!(outcome, Intercept::Declined(_)));
    }

    #[test]
    fn test_closure_hook_owns_callback() {
        let get = |_: &Request, _: Instant, on_response: ResponseCallback| {
            on_response(Some(Response {
                status: 204,
                headers: Vec::new(),
                body: Bytes::new(),
            }));
            Intercept::Handled
        };
        let overrides = Overrides::new(Some(Arc::new(get)), None);

        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let outcome = overrides.offer_get(
            &Request::new("h", "/"),
            Instant::now(),
            Box::new(move |response: Option<Response>| *sink.lock().unwrap() = response.map(|r| r.status)),
        );

        assert!(matches!(outcome, Intercept::Handled));
        assert_eq!(*seen.lock().unwrap(), Some(204));
    }

    #[test]
    fn test_post_hook_sees_body_and_can_decline() {
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&bodies);
        let post = move |_: &Request, body: &[u8], _: Instant, on_response: ResponseCallback| {
            recorded.lock().unwrap().push(body.to_vec());
            Intercept::Declined(on_response)
        };
        let overrides = Overrides::new(None, Some(Arc::new(post)));

        let outcome = overrides.offer_post(
            &Request::new("h", "/"),
            b"payload",
            Instant::now(),
            Box::new(|_: Option<Response>| {}),
        );
        assert!(matches!(outcome, Intercept::Declined(_)));
        assert_eq!(*bodies.lock().unwrap(), vec![b"payload".to_vec()]);
    }
}
