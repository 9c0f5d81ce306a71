//! # Unified Network - a configuration-merging HTTP request layer
//!
//! Define the shape of your requests once (base URL, default headers, default
//! method and body, transport) and issue many requests that layer per-call
//! overrides on top. URL placeholders are substituted, query strings are
//! assembled, structured bodies are sent as JSON and JSON replies are parsed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unified_network::{unified_network, RequestConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), unified_network::Error> {
//!     let network = unified_network(Some(
//!         RequestConfig::new()
//!             .with_base_url("https://api.example.com")
//!             .with_header("Token", "123"),
//!     ))?;
//!
//!     // GET https://api.example.com/users/23?verbose=true
//!     let response = network
//!         .get(
//!             RequestConfig::new()
//!                 .with_url("users/[id]")
//!                 .with_parameter("id", 23)
//!                 .with_query("verbose", true),
//!         )
//!         .await;
//!
//!     println!("{} {:?}", response.status, response.json());
//!
//!     // POST with a JSON body
//!     let response = network
//!         .post(
//!             RequestConfig::new()
//!                 .with_url("users")
//!                 .with_body(serde_json::json!({ "name": "Alice" })),
//!         )
//!         .await;
//!
//!     if response.is_failure() {
//!         eprintln!("request never reached the server");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layered configuration** - Per-call fields override the base; headers,
//!   parameters and queries are unioned key by key
//! - **URL templating** - `[name]` placeholders are replaced from `parameters`
//! - **Automatic JSON** - Structured bodies are encoded, JSON replies decoded
//! - **Pluggable transport** - Swap the [`Processor`] per dispatcher, per base
//!   configuration, or per call
//! - **No error handling at the call site** - Every request resolves to a
//!   [`UnifiedResponse`]; failures carry status `-1`
//! - **Logging** - Structured logging with `tracing`
//!
//! ## Custom transports
//!
//! ```
//! use unified_network::{processor_fn, Dispatcher, RawResponse, RequestConfig, ResolvedRequest};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let dispatcher = Dispatcher::with_processor(
//!     Some(RequestConfig::new().with_base_url("https://api.example.com")),
//!     processor_fn(|request: ResolvedRequest| async move {
//!         RawResponse::new(200, format!(r#"{{"url":"{}"}}"#, request.url))
//!             .with_header("content-type", "application/json")
//!     }),
//! );
//!
//! let response = dispatcher.get(RequestConfig::new().with_url("ping")).await;
//! assert_eq!(response.json().unwrap()["url"], "https://api.example.com/ping");
//! # }
//! ```

mod client;
pub mod config;
mod error;
mod path;
pub mod processor;
pub mod resolve;
mod response;

pub use client::Dispatcher;
pub use config::{Body, Method, Multipart, RequestConfig};
pub use error::{Error, Result};
pub use path::join_paths;
pub use processor::{processor_fn, Processor, RawResponse, ReqwestProcessor};
pub use resolve::{RequestBody, ResolvedRequest};
pub use response::{ResponseData, UnifiedResponse, FAILURE_STATUS};

/// Creates a [`Dispatcher`] with an optional base configuration and the
/// default transport.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn unified_network(base: Option<RequestConfig>) -> Result<Dispatcher> {
    Dispatcher::new(base)
}
