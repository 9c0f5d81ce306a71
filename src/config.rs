//! Request configuration types.
//!
//! A [`RequestConfig`] describes either the defaults held by a
//! [`Dispatcher`](crate::Dispatcher) or the overrides supplied for a single
//! call. Every field is optional; the two layers are combined with per-call
//! precedence when a request is resolved.

use crate::{processor::Processor, Error};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// The HTTP verbs a request can be issued with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// `GET`, used when neither layer names a method.
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
}

impl Method {
    /// Returns the upper-case wire name of the verb.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
        }
    }

    /// Converts to the equivalent [`http::Method`].
    pub fn to_http(self) -> http::Method {
        match self {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
            Method::Patch => http::Method::PATCH,
            Method::Delete => http::Method::DELETE,
            Method::Head => http::Method::HEAD,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Parses a verb name in any ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use unified_network::Method;
    ///
    /// assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
    /// assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
    /// assert!("TRACE".parse::<Method>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            "HEAD" => Ok(Method::Head),
            other => Err(Error::ConfigurationError(format!(
                "Unsupported method: {}",
                other
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// A request body as supplied by the caller.
///
/// Structured JSON values are encoded by the resolver; form payloads are
/// already encoded and pass through to the transport unmodified.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A JSON value. Objects and arrays are serialized and sent with
    /// `Content-Type: application/json`; scalars are sent as their text.
    Json(Value),
    /// Raw text sent as-is.
    Text(String),
    /// URL-encoded form parameters.
    Form(Vec<(String, String)>),
    /// A multipart form.
    Multipart(Multipart),
}

impl Body {
    /// Builds a URL-encoded form body from key/value pairs.
    pub fn form<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<Multipart> for Body {
    fn from(form: Multipart) -> Self {
        Body::Multipart(form)
    }
}

impl<'de> Deserialize<'de> for Body {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(Body::Json)
    }
}

/// A multipart form payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Multipart {
    parts: Vec<Part>,
}

/// One field of a [`Multipart`] form.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// The form field name.
    pub name: String,
    /// The raw field content.
    pub data: Vec<u8>,
    /// File name reported for file fields.
    pub file_name: Option<String>,
    /// MIME type of the field content.
    pub mime: Option<String>,
}

impl Multipart {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            data: value.into().into_bytes(),
            file_name: None,
            mime: None,
        });
        self
    }

    /// Adds a file field.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            data: data.into(),
            file_name: Some(file_name.into()),
            mime: mime.map(str::to_string),
        });
        self
    }

    /// Returns the fields in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

/// One layer of request configuration.
///
/// Used both for the base configuration held by a dispatcher and for the
/// per-call overrides. Fields the crate does not recognize are collected in
/// [`extra`](RequestConfig::extra) and handed to the processor untouched.
///
/// # Examples
///
/// ```
/// use unified_network::{Method, RequestConfig};
///
/// let config = RequestConfig::new()
///     .with_method(Method::Post)
///     .with_base_url("https://api.example.com")
///     .with_url("users/[id]")
///     .with_parameter("id", 23)
///     .with_query("verbose", true)
///     .with_header("Token", "123");
///
/// assert_eq!(config.method, Some(Method::Post));
/// assert_eq!(config.headers["Token"], "123");
/// ```
///
/// A base configuration can also be loaded from JSON:
///
/// ```
/// use unified_network::{Method, RequestConfig};
///
/// let config: RequestConfig = serde_json::from_str(
///     r#"{ "method": "put", "baseUrl": "https://api.example.com", "mode": "cors" }"#,
/// ).unwrap();
///
/// assert_eq!(config.method, Some(Method::Put));
/// assert_eq!(config.extra["mode"], "cors");
/// ```
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// The HTTP verb.
    pub method: Option<Method>,

    /// Prefix joined in front of [`url`](RequestConfig::url).
    pub base_url: Option<String>,

    /// The request URL or path, possibly containing `[name]` placeholders.
    pub url: Option<String>,

    /// Placeholder substitutions, keyed by placeholder name.
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,

    /// Query string entries.
    #[serde(default)]
    pub queries: BTreeMap<String, Value>,

    /// Request headers. Names are kept exactly as provided.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// The request body.
    pub body: Option<Body>,

    /// Transport override for requests using this layer.
    #[serde(skip)]
    pub processor: Option<Arc<dyn Processor>>,

    /// Unrecognized fields, passed through to the processor.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestConfig {
    /// Creates an empty configuration layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the URL or path.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Adds a placeholder substitution.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Adds a query string entry.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.queries.insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a transport override.
    pub fn with_processor(mut self, processor: impl Processor + 'static) -> Self {
        self.processor = Some(Arc::new(processor));
        self
    }

    /// Adds a passthrough field.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Layers `call` on top of `self`.
    ///
    /// Fields set in `call` win; fields absent from `call` fall back to
    /// `self`. `headers`, `parameters`, `queries` and the passthrough fields
    /// are unioned key by key, with `call` overriding same-named entries.
    ///
    /// # Examples
    ///
    /// ```
    /// use unified_network::RequestConfig;
    ///
    /// let base = RequestConfig::new().with_header("A", "1").with_header("B", "2");
    /// let call = RequestConfig::new().with_header("B", "3").with_header("C", "4");
    ///
    /// let merged = base.merge(&call);
    /// assert_eq!(merged.headers["A"], "1");
    /// assert_eq!(merged.headers["B"], "3");
    /// assert_eq!(merged.headers["C"], "4");
    /// ```
    pub fn merge(&self, call: &RequestConfig) -> RequestConfig {
        let mut extra = self.extra.clone();
        extra.extend(call.extra.clone());

        RequestConfig {
            method: call.method.or(self.method),
            base_url: call.base_url.clone().or_else(|| self.base_url.clone()),
            url: call.url.clone().or_else(|| self.url.clone()),
            parameters: merge_maps(&self.parameters, &call.parameters),
            queries: merge_maps(&self.queries, &call.queries),
            headers: merge_maps(&self.headers, &call.headers),
            body: call.body.clone().or_else(|| self.body.clone()),
            processor: call.processor.clone().or_else(|| self.processor.clone()),
            extra,
        }
    }
}

impl fmt::Debug for RequestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestConfig")
            .field("method", &self.method)
            .field("base_url", &self.base_url)
            .field("url", &self.url)
            .field("parameters", &self.parameters)
            .field("queries", &self.queries)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("processor", &self.processor.as_ref().map(|_| "<processor>"))
            .field("extra", &self.extra)
            .finish()
    }
}

/// Shallow union of two maps where `call` entries replace `base` entries.
pub(crate) fn merge_maps<V: Clone>(
    base: &BTreeMap<String, V>,
    call: &BTreeMap<String, V>,
) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    merged.extend(call.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
