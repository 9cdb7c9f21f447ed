//! Command-line front end for the request engine.
//!
//! ```text
//! rpc-httpcli [--config FILE] [--deadline-secs N] [-H K:V]... [--metrics] get <URL>
//! rpc-httpcli ... post <URL> [--data STRING | --data-file PATH]
//! ```
//!
//! Prints the response as JSON and exits non-zero when the request fails.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio::time::Instant;
use url::Url;

use rpc_httpcli::config::{load_config, HttpCliConfig};
use rpc_httpcli::observability::logging::init_logging;
use rpc_httpcli::observability::metrics::init_metrics;
use rpc_httpcli::{Context, HttpClient, Pollset, Request, Response};

#[derive(Parser)]
#[command(name = "rpc-httpcli")]
#[command(about = "Issue a single HTTP/1.1 request through the async engine", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overall deadline; defaults to `client.default_deadline_secs`
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    /// Extra request header as `Key: Value` (repeatable)
    #[arg(short = 'H', long = "header", global = true)]
    headers: Vec<String>,

    /// Serve Prometheus metrics while the request runs
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get { url: String },
    /// Send a POST request
    Post {
        url: String,

        /// Request body
        #[arg(short, long, conflicts_with = "data_file")]
        data: Option<String>,

        /// Read the request body from a file
        #[arg(long)]
        data_file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HttpCliConfig::default(),
    };
    init_logging(&config.observability.log_filter)?;

    if cli.metrics || config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let deadline_secs = cli
        .deadline_secs
        .unwrap_or(config.client.default_deadline_secs);
    let deadline = Instant::now() + Duration::from_secs(deadline_secs);

    let client = HttpClient::new(config.client.clone());
    let context = Context::new();
    let pollset = Pollset::new();

    let result = match &cli.command {
        Commands::Get { url } => {
            let request = build_request(url, &cli.headers)?;
            client.get_async(&context, &pollset, &request, deadline).await
        }
        Commands::Post {
            url,
            data,
            data_file,
        } => {
            let request = build_request(url, &cli.headers)?;
            let body = match (data, data_file) {
                (Some(data), _) => data.clone().into_bytes(),
                (None, Some(path)) => tokio::fs::read(path).await?,
                (None, None) => Vec::new(),
            };
            client
                .post_async(&context, &pollset, &request, &body, deadline)
                .await
        }
    };
    context.destroy();

    let response = result?;
    println!("{}", serde_json::to_string_pretty(&render(&response))?);
    Ok(())
}

/// Turn an `http://` URL plus `Key: Value` strings into a request.
fn build_request(raw: &str, headers: &[String]) -> Result<Request, Box<dyn std::error::Error>> {
    let url = Url::parse(raw)?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme '{}', only http is available", url.scheme()).into());
    }
    let host = url.host_str().ok_or("URL has no host")?;
    let host = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    let path = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };

    let mut request = Request::new(host, path);
    for header in headers {
        let (key, value) = header
            .split_once(':')
            .ok_or_else(|| format!("header '{}' is not in Key: Value form", header))?;
        request = request.header(key.trim(), value.trim());
    }
    Ok(request)
}

fn render(response: &Response) -> Value {
    let headers: Vec<Value> = response
        .headers
        .iter()
        .map(|h| json!({ "name": h.key, "value": h.value }))
        .collect();
    json!({
        "status": response.status,
        "headers": headers,
        "body": String::from_utf8_lossy(&response.body),
    })
}
