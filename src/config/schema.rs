//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the HTTP client and its command-line front end.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HttpCliConfig {
    /// Request engine settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Request engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Value sent in the `User-Agent` header of every request.
    pub user_agent: String,

    /// Capacity of the buffer each read fills.
    pub read_buffer_size: usize,

    /// Set `TCP_NODELAY` on connected sockets.
    pub tcp_nodelay: bool,

    /// Deadline applied by callers that do not supply their own, in seconds.
    pub default_deadline_secs: u64,

    /// Response size limits.
    pub limits: LimitsConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("rpc-httpcli/", env!("CARGO_PKG_VERSION")).to_string(),
            read_buffer_size: 8192,
            tcp_nodelay: true,
            default_deadline_secs: 30,
            limits: LimitsConfig::default(),
        }
    }
}

/// Bounds on how much of a response is buffered.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of the status line plus headers.
    pub max_head_bytes: usize,

    /// Maximum size of the response body.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_head_bytes: 16 * 1024,
            max_body_bytes: 4 * 1024 * 1024, // 4MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default `tracing` filter directive; `RUST_LOG` takes precedence.
    pub log_filter: String,

    /// Expose Prometheus metrics.
    pub metrics_enabled: bool,

    /// Address for the metrics endpoint.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "rpc_httpcli=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
