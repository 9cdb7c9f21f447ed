//! Asynchronous HTTP request engine.
//!
//! # Data Flow
//! ```text
//! HttpClient::get/post(context, pollset, request, deadline, callback)
//!     → overrides.rs (hook may claim the request; nothing else runs)
//!     → format.rs (request → immutable byte buffer)
//!     → register pollset with Context, register diagnostic object
//!     → engine.rs (resolve → connect → handshake → write → read)
//!         → parser.rs (incremental response parsing)
//!     → deregister pollset → callback(Some(response) | None)
//!     → unregister diagnostic object → kick pollset
//! ```
//!
//! # Design Decisions
//! - The callback fires exactly once: a `Completion` guard reports `None`
//!   if the task is dropped before it finishes
//! - Overrides are an injected strategy, swapped atomically per client
//! - The callback API reports only success or failure; the async API
//!   returns the full `RequestError`

use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};

use arc_swap::ArcSwap;
use bytes::Bytes;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::Instrument;

pub mod engine;
pub mod error;
pub mod format;
pub mod overrides;
pub mod parser;
pub mod request;
pub mod response;

pub use error::{ParseError, RequestError};
pub use overrides::{GetOverride, Intercept, Overrides, PostOverride, ResponseCallback};
pub use request::{Header, Method, Request};
pub use response::Response;

use crate::client::engine::InFlight;
use crate::client::format::{format_get_request, format_post_request};
use crate::config::ClientConfig;
use crate::net::{Connect, DnsResolver, Resolve, TcpConnector};
use crate::observability::metrics;
use crate::observability::{ObjectGuard, ObjectRegistry};
use crate::poll::{Context, Pollset, PollsetRegistration};

struct Shared {
    resolver: Arc<dyn Resolve>,
    connector: Arc<dyn Connect>,
    overrides: ArcSwap<Overrides>,
    registry: ObjectRegistry,
    config: ClientConfig,
}

/// Issues GET and POST requests without blocking any thread.
///
/// Cheap to clone; clones share resolver, connector, overrides and
/// diagnostic registry. Requests must be started from within a Tokio
/// runtime.
#[derive(Clone)]
pub struct HttpClient {
    shared: Arc<Shared>,
}

impl HttpClient {
    /// Client using the system resolver and plain TCP.
    pub fn new(config: ClientConfig) -> Self {
        Self::builder().config(config).build()
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.shared.config
    }

    /// Diagnostic registry holding one entry per in-flight request.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.shared.registry
    }

    /// Replace both override hooks at once.
    pub fn set_override(
        &self,
        get: Option<Arc<dyn GetOverride>>,
        post: Option<Arc<dyn PostOverride>>,
    ) {
        self.shared.overrides.store(Arc::new(Overrides::new(get, post)));
    }

    /// Start a GET; `on_response` runs exactly once with the outcome.
    pub fn get<F>(
        &self,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        deadline: Instant,
        on_response: F,
    ) where
        F: FnOnce(Option<Response>) + Send + 'static,
    {
        let on_response: ResponseCallback = Box::new(on_response);
        let outcome = self.shared.overrides.load().offer_get(request, deadline, on_response);
        let on_response = match outcome {
            Intercept::Handled => return,
            Intercept::Declined(on_response) => on_response,
        };
        let request_text = format_get_request(request, &self.shared.config.user_agent);
        self.spawn(Method::Get, context, pollset, request, request_text, deadline, on_response);
    }

    /// Start a POST of `body`; `on_response` runs exactly once with the outcome.
    pub fn post<F>(
        &self,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        body: &[u8],
        deadline: Instant,
        on_response: F,
    ) where
        F: FnOnce(Option<Response>) + Send + 'static,
    {
        let on_response: ResponseCallback = Box::new(on_response);
        let outcome = self
            .shared
            .overrides
            .load()
            .offer_post(request, body, deadline, on_response);
        let on_response = match outcome {
            Intercept::Handled => return,
            Intercept::Declined(on_response) => on_response,
        };
        let request_text = format_post_request(request, body, &self.shared.config.user_agent);
        self.spawn(Method::Post, context, pollset, request, request_text, deadline, on_response);
    }

    /// Run a GET on the current task and return the detailed outcome.
    pub async fn get_async(
        &self,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        deadline: Instant,
    ) -> Result<Response, RequestError> {
        let (tx, rx) = oneshot::channel();
        let on_response: ResponseCallback = Box::new(move |response: Option<Response>| {
            let _ = tx.send(response);
        });
        let outcome = self.shared.overrides.load().offer_get(request, deadline, on_response);
        if let Intercept::Handled = outcome {
            return intercepted(rx).await;
        }
        let request_text = format_get_request(request, &self.shared.config.user_agent);
        self.begin(Method::Get, context, pollset, request, request_text, deadline)
            .run(|result| result)
            .await
    }

    /// Run a POST on the current task and return the detailed outcome.
    pub async fn post_async(
        &self,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        body: &[u8],
        deadline: Instant,
    ) -> Result<Response, RequestError> {
        let (tx, rx) = oneshot::channel();
        let on_response: ResponseCallback = Box::new(move |response: Option<Response>| {
            let _ = tx.send(response);
        });
        let outcome = self
            .shared
            .overrides
            .load()
            .offer_post(request, body, deadline, on_response);
        if let Intercept::Handled = outcome {
            return intercepted(rx).await;
        }
        let request_text = format_post_request(request, body, &self.shared.config.user_agent);
        self.begin(Method::Post, context, pollset, request, request_text, deadline)
            .run(|result| result)
            .await
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn(
        &self,
        method: Method,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        request_text: Bytes,
        deadline: Instant,
        on_response: ResponseCallback,
    ) {
        let pending = self.begin(method, context, pollset, request, request_text, deadline);
        let completion = Completion::new(on_response);
        tokio::spawn(async move {
            pending
                .run(|result| completion.complete(result.ok()))
                .await;
        });
    }

    /// Allocate the in-flight state and take the start-of-request registrations.
    fn begin(
        &self,
        method: Method,
        context: &Context,
        pollset: &Pollset,
        request: &Request,
        request_text: Bytes,
        deadline: Instant,
    ) -> Pending {
        let object = self
            .shared
            .registry
            .register(format!("HTTP:{}:{}:{}", method, request.host, request.path));
        let span = tracing::debug_span!(
            "http_request",
            method = method.as_str(),
            host = %request.host,
            path = %request.path,
            object = %object.id(),
        );

        let handshaker = request.resolved_handshaker();
        tracing::debug!(
            parent: &span,
            handshaker = handshaker.name(),
            bytes = request_text.len(),
            "Starting request"
        );

        let in_flight = InFlight::new(
            request_text,
            request.host.clone(),
            deadline,
            handshaker,
            Arc::clone(&self.shared.resolver),
            Arc::clone(&self.shared.connector),
            &self.shared.config,
        );
        Pending {
            in_flight,
            scope: RequestScope::open(method, context, pollset, object),
            span,
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.shared.config)
            .field("overrides", &**self.shared.overrides.load())
            .field("in_flight", &self.shared.registry.live_count())
            .finish()
    }
}

async fn intercepted(rx: oneshot::Receiver<Option<Response>>) -> Result<Response, RequestError> {
    rx.await.ok().flatten().ok_or(RequestError::Intercepted)
}

/// Start-of-request bookkeeping, released on every exit path.
///
/// Dropping the scope deregisters the pollset, closes out the in-flight
/// gauge if the request never finished, releases the diagnostic object and
/// kicks the pollset. This also covers a future dropped mid-flight and a
/// panicking callback.
struct RequestScope {
    method: Method,
    started: StdInstant,
    registration: Option<PollsetRegistration>,
    object: Option<ObjectGuard>,
    pollset: Pollset,
    recorded: bool,
}

impl RequestScope {
    fn open(method: Method, context: &Context, pollset: &Pollset, object: ObjectGuard) -> Self {
        let registration = context.register(pollset);
        metrics::record_request_started();
        Self {
            method,
            started: StdInstant::now(),
            registration: Some(registration),
            object: Some(object),
            pollset: pollset.clone(),
            recorded: false,
        }
    }

    fn deregister(&mut self) {
        self.registration.take();
    }

    /// Record the outcome and return the request's duration.
    fn record(&mut self, success: bool) -> Duration {
        let elapsed = self.started.elapsed();
        metrics::record_request_finished(self.method.as_str(), success, elapsed);
        self.recorded = true;
        elapsed
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.registration.take();
        if !self.recorded {
            tracing::warn!(method = self.method.as_str(), "Request abandoned before completion");
            metrics::record_request_finished(self.method.as_str(), false, self.started.elapsed());
        }
        self.object.take();
        self.pollset.kick();
    }
}

/// A started request that has not run yet.
struct Pending {
    in_flight: InFlight,
    scope: RequestScope,
    span: tracing::Span,
}

impl Pending {
    /// Run to completion and hand the outcome to `deliver`.
    ///
    /// `deliver` runs after the pollset is deregistered and before the
    /// diagnostic object is released and the pollset kicked.
    async fn run<R>(self, deliver: impl FnOnce(Result<Response, RequestError>) -> R) -> R {
        let Pending {
            in_flight,
            mut scope,
            span,
        } = self;

        let result = in_flight.run().instrument(span.clone()).await;

        scope.deregister();
        let elapsed = scope.record(result.is_ok());
        span.in_scope(|| match &result {
            Ok(response) => tracing::info!(
                status = response.status,
                body_bytes = response.body.len(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Request finished"
            ),
            Err(e) => tracing::warn!(
                error = %e,
                elapsed_ms = elapsed.as_millis() as u64,
                "Request failed"
            ),
        });

        let delivered = deliver(result);
        drop(scope);
        delivered
    }
}

/// Owns the caller's callback until it has been invoked.
struct Completion {
    on_response: Option<ResponseCallback>,
}

impl Completion {
    fn new(on_response: ResponseCallback) -> Self {
        Self {
            on_response: Some(on_response),
        }
    }

    fn complete(mut self, response: Option<Response>) {
        if let Some(on_response) = self.on_response.take() {
            on_response(response);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if let Some(on_response) = self.on_response.take() {
            tracing::warn!("Request dropped before completion");
            on_response(None);
        }
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    resolver: Arc<dyn Resolve>,
    connector: Option<Arc<dyn Connect>>,
    overrides: Overrides,
    registry: ObjectRegistry,
    config: ClientConfig,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            resolver: Arc::new(DnsResolver),
            connector: None,
            overrides: Overrides::none(),
            registry: ObjectRegistry::new(),
            config: ClientConfig::default(),
        }
    }
}

impl HttpClientBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn resolver(mut self, resolver: Arc<dyn Resolve>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Defaults to a [`TcpConnector`] honouring `tcp_nodelay`.
    pub fn connector(mut self, connector: Arc<dyn Connect>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Share a diagnostic registry with other components.
    pub fn registry(mut self, registry: ObjectRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn build(self) -> HttpClient {
        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TcpConnector::new(self.config.tcp_nodelay)));
        HttpClient {
            shared: Arc::new(Shared {
                resolver: self.resolver,
                connector,
                overrides: ArcSwap::from_pointee(self.overrides),
                registry: self.registry,
                config: self.config,
            }),
        }
    }
}
