//! The request dispatcher.
//!
//! A [`Dispatcher`] holds a base [`RequestConfig`] and a default
//! [`Processor`]. Each call layers its own configuration on top of the base,
//! resolves it, sends it through the selected processor, and normalizes the
//! reply into a [`UnifiedResponse`].

use crate::{
    config::Method,
    processor::{Processor, ReqwestProcessor},
    resolve::{self, pick, ResolvedRequest},
    RequestConfig, Result, UnifiedResponse,
};
use std::sync::Arc;
use std::time::Instant;

/// Issues requests against a base configuration.
///
/// The base configuration is only changed through [`set_header`],
/// [`remove_header`] and [`apply_header`], which take `&mut self`; requests
/// borrow the dispatcher immutably, so in-flight calls always see a stable
/// base.
///
/// [`set_header`]: Dispatcher::set_header
/// [`remove_header`]: Dispatcher::remove_header
/// [`apply_header`]: Dispatcher::apply_header
///
/// # Examples
///
/// ```no_run
/// use unified_network::{Dispatcher, RequestConfig};
///
/// # async fn example() -> Result<(), unified_network::Error> {
/// let base = RequestConfig::new()
///     .with_base_url("https://api.example.com")
///     .with_header("Accept", "application/json");
///
/// let mut dispatcher = Dispatcher::new(Some(base))?;
/// dispatcher.apply_header("Authorization", Some("Bearer token"));
///
/// let response = dispatcher
///     .get(RequestConfig::new().with_url("users/[id]").with_parameter("id", 23))
///     .await;
///
/// if response.is_failure() {
///     eprintln!("request never reached the server");
/// } else if let Some(user) = response.json() {
///     println!("{} -> {}", response.status, user["name"]);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Dispatcher {
    base: RequestConfig,
    processor: Arc<dyn Processor>,
}

impl Dispatcher {
    /// Creates a dispatcher using the default [`ReqwestProcessor`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base: Option<RequestConfig>) -> Result<Self> {
        Ok(Self::with_processor(base, ReqwestProcessor::new()?))
    }

    /// Creates a dispatcher with a custom default processor.
    ///
    /// Processors set on the base configuration or on a call still take
    /// precedence over this one.
    pub fn with_processor(base: Option<RequestConfig>, processor: impl Processor + 'static) -> Self {
        Self {
            base: base.unwrap_or_default(),
            processor: Arc::new(processor),
        }
    }

    /// Returns the base configuration.
    pub fn base(&self) -> &RequestConfig {
        &self.base
    }

    /// Resolves a per-call configuration against the base without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be encoded.
    pub fn resolve(&self, config: &RequestConfig) -> Result<ResolvedRequest> {
        resolve::resolve(&self.base, config)
    }

    /// Sends a request.
    ///
    /// This never fails: transport errors and undecodable JSON replies are
    /// logged and reported as [`UnifiedResponse::failed`].
    pub async fn request(&self, config: RequestConfig) -> UnifiedResponse {
        match self.dispatch(&config).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    url = ?config.url,
                    transport = e.is_transport(),
                    status = ?e.status(),
                    raw_response = e.raw_response().unwrap_or_default(),
                    "Request failed"
                );
                UnifiedResponse::failed()
            }
        }
    }

    async fn dispatch(&self, config: &RequestConfig) -> Result<UnifiedResponse> {
        let processor = pick(
            config.processor.clone(),
            self.base.processor.clone(),
            || self.processor.clone(),
        );
        let request = self.resolve(config)?;

        tracing::debug!(
            method = %request.method,
            url = %request.url,
            "Dispatching request"
        );

        let start_time = Instant::now();
        let raw = processor.process(request).await?;

        tracing::info!(
            status = raw.status,
            latency_ms = start_time.elapsed().as_millis(),
            "Received response"
        );

        UnifiedResponse::from_raw(raw)
    }

    /// Sends a `GET` request.
    pub async fn get(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Get)).await
    }

    /// Sends a `POST` request.
    pub async fn post(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Post)).await
    }

    /// Sends a `PUT` request.
    pub async fn put(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Put)).await
    }

    /// Sends a `PATCH` request.
    pub async fn patch(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Patch)).await
    }

    /// Sends a `DELETE` request.
    pub async fn delete(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Delete)).await
    }

    /// Sends a `HEAD` request.
    pub async fn head(&self, config: RequestConfig) -> UnifiedResponse {
        self.request(config.with_method(Method::Head)).await
    }

    /// Sets a default header, replacing any existing value.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.base.headers.insert(name.into(), value.into());
    }

    /// Removes a default header. Does nothing if it is not set.
    pub fn remove_header(&mut self, name: &str) {
        self.base.headers.remove(name);
    }

    /// Sets a default header, or removes it when `value` is `None` or empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use unified_network::{Dispatcher, RawResponse, ResolvedRequest, processor_fn};
    ///
    /// let mut dispatcher = Dispatcher::with_processor(None, processor_fn(|_: ResolvedRequest| async {
    ///     Ok::<_, unified_network::Error>(RawResponse::new(200, ""))
    /// }));
    ///
    /// dispatcher.apply_header("Authorization", Some("Bearer abc"));
    /// assert_eq!(dispatcher.base().headers["Authorization"], "Bearer abc");
    ///
    /// dispatcher.apply_header("Authorization", Some(""));
    /// assert!(!dispatcher.base().headers.contains_key("Authorization"));
    /// ```
    pub fn apply_header(&mut self, name: impl Into<String>, value: Option<&str>) {
        let name = name.into();
        match value {
            Some(value) if !value.is_empty() => self.set_header(name, value),
            _ => self.remove_header(&name),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{processor_fn, RawResponse};

    fn stub_dispatcher(base: Option<RequestConfig>) -> Dispatcher {
        Dispatcher::with_processor(
            base,
            processor_fn(|_: ResolvedRequest| async {
                Ok::<_, crate::Error>(RawResponse::new(200, "default"))
            }),
        )
    }

    #[test]
    fn test_headers_start_empty() {
        assert!(stub_dispatcher(None).base().headers.is_empty());
    }

    #[test]
    fn test_set_and_remove_header() {
        let mut dispatcher = stub_dispatcher(Some(RequestConfig::new().with_header("A", "1")));

        dispatcher.set_header("A", "2");
        dispatcher.set_header("B", "3");
        assert_eq!(dispatcher.base().headers["A"], "2");
        assert_eq!(dispatcher.base().headers["B"], "3");

        dispatcher.remove_header("A");
        assert!(!dispatcher.base().headers.contains_key("A"));

        // Removing an absent header is a no-op.
        dispatcher.remove_header("missing");
        assert_eq!(dispatcher.base().headers.len(), 1);
    }

    #[test]
    fn test_apply_header() {
        let mut dispatcher = stub_dispatcher(None);

        dispatcher.apply_header("Token", Some("v"));
        assert_eq!(dispatcher.base().headers["Token"], "v");

        dispatcher.apply_header("Token", Some(""));
        assert!(!dispatcher.base().headers.contains_key("Token"));

        dispatcher.apply_header("Token", Some("w"));
        dispatcher.apply_header("Token", None);
        assert!(!dispatcher.base().headers.contains_key("Token"));
    }

    #[tokio::test]
    async fn test_processor_precedence() {
        let base = RequestConfig::new().with_processor(processor_fn(|_: ResolvedRequest| async {
            Ok::<_, crate::Error>(RawResponse::new(200, "base"))
        }));
        let dispatcher = stub_dispatcher(Some(base));

        let response = dispatcher.get(RequestConfig::new()).await;
        assert_eq!(response.text(), Some("base"));

        let call = RequestConfig::new().with_processor(processor_fn(|_: ResolvedRequest| async {
            Ok::<_, crate::Error>(RawResponse::new(200, "call"))
        }));
        let response = dispatcher.get(call).await;
        assert_eq!(response.text(), Some("call"));

        let response = stub_dispatcher(None).get(RequestConfig::new()).await;
        assert_eq!(response.text(), Some("default"));
    }

    #[tokio::test]
    async fn test_processor_error_becomes_failure() {
        let dispatcher = Dispatcher::with_processor(
            None,
            processor_fn(|_: ResolvedRequest| async {
                Err::<RawResponse, _>(crate::Error::processor("connection reset"))
            }),
        );

        let response = dispatcher.get(RequestConfig::new()).await;
        assert_eq!(response, UnifiedResponse::failed());
    }
}
