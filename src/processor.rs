//! The transport boundary.
//!
//! A [`Processor`] performs the actual network exchange for a
//! [`ResolvedRequest`] and returns the raw status, headers and body text.
//! [`ReqwestProcessor`] is the default; tests and alternate transports can
//! supply their own, per dispatcher or per request.

use crate::{
    config::Multipart,
    resolve::{RequestBody, ResolvedRequest},
    Error, Result,
};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use std::future::Future;
use std::time::Duration;

/// A pluggable transport.
///
/// Implementations return `Err` when no response was obtained. The
/// dispatcher turns any error into the failure response.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use unified_network::{Processor, RawResponse, ResolvedRequest, Result};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Processor for Echo {
///     async fn process(&self, request: ResolvedRequest) -> Result<RawResponse> {
///         Ok(RawResponse::new(200, request.url))
///     }
/// }
/// ```
#[async_trait]
pub trait Processor: Send + Sync {
    /// Sends the request and returns the raw reply.
    async fn process(&self, request: ResolvedRequest) -> Result<RawResponse>;
}

/// The raw reply of a processor, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HeaderMap,
    /// The response body as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Adds a header to the response.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }
}

/// A [`Processor`] backed by an async function or closure.
///
/// Created with [`processor_fn`].
pub struct FnProcessor<F> {
    f: F,
}

/// Wraps an async function as a [`Processor`].
///
/// # Examples
///
/// ```
/// use unified_network::{processor_fn, RawResponse, RequestConfig, ResolvedRequest};
///
/// let config = RequestConfig::new().with_processor(processor_fn(|request: ResolvedRequest| async move {
///     Ok::<_, unified_network::Error>(RawResponse::new(
///         204,
///         format!("{} {}", request.method, request.url),
///     ))
/// }));
/// assert!(config.processor.is_some());
/// ```
pub fn processor_fn<F, Fut>(f: F) -> FnProcessor<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    FnProcessor { f }
}

#[async_trait]
impl<F, Fut> Processor for FnProcessor<F>
where
    F: Fn(ResolvedRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<RawResponse>> + Send + 'static,
{
    async fn process(&self, request: ResolvedRequest) -> Result<RawResponse> {
        (self.f)(request).await
    }
}

/// The default transport, built on `reqwest`.
///
/// Passthrough fields on the request are accepted and ignored.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use unified_network::{Dispatcher, ReqwestProcessor};
///
/// # fn example() -> Result<(), unified_network::Error> {
/// let processor = ReqwestProcessor::builder()
///     .timeout(Duration::from_secs(30))
///     .user_agent("my-app/1.0")
///     .build()?;
///
/// let dispatcher = Dispatcher::with_processor(None, processor);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestProcessor {
    http_client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestProcessor {
    /// Creates a processor with default settings and no timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    /// Creates a new `ReqwestProcessorBuilder`.
    pub fn builder() -> ReqwestProcessorBuilder {
        ReqwestProcessorBuilder::new()
    }
}

#[async_trait]
impl Processor for ReqwestProcessor {
    async fn process(&self, request: ResolvedRequest) -> Result<RawResponse> {
        let mut builder = self
            .http_client
            .request(request.method.to_http(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            Some(RequestBody::Text(text)) => builder.body(text),
            Some(RequestBody::Form(pairs)) => builder.form(&pairs),
            Some(RequestBody::Multipart(form)) => builder.multipart(into_reqwest_form(form)?),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

fn into_reqwest_form(form: Multipart) -> Result<reqwest::multipart::Form> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.parts() {
        let mut field = reqwest::multipart::Part::bytes(part.data.clone());
        if let Some(file_name) = &part.file_name {
            field = field.file_name(file_name.clone());
        }
        if let Some(mime) = &part.mime {
            field = field.mime_str(mime)?;
        }
        out = out.part(part.name.clone(), field);
    }
    Ok(out)
}

/// Builder for configuring and creating a [`ReqwestProcessor`].
#[derive(Debug, Default)]
pub struct ReqwestProcessorBuilder {
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ReqwestProcessorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a per-request timeout. Without one, requests may wait
    /// indefinitely.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` sent when a request does not supply one.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configured `ReqwestProcessor`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client configuration is invalid.
    pub fn build(self) -> Result<ReqwestProcessor> {
        let mut builder = reqwest::Client::builder();
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let http_client = builder.build().map_err(|e| {
            Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(ReqwestProcessor {
            http_client,
            timeout: self.timeout,
        })
    }
}
