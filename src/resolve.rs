//! Request resolution.
//!
//! Turns a base [`RequestConfig`] and a per-call [`RequestConfig`] into a
//! single [`ResolvedRequest`]: the URL is joined, placeholders are
//! substituted, the query string is appended, and the body is encoded.

use crate::{
    config::{Body, Method, Multipart},
    path::join_paths,
    Error, RequestConfig, Result,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Header set when a structured body is encoded as JSON.
pub const CONTENT_TYPE: &str = "Content-Type";

/// A fully merged request, ready for a [`Processor`](crate::Processor).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    /// The HTTP verb.
    pub method: Method,
    /// The final URL with placeholders substituted and queries appended.
    pub url: String,
    /// The merged headers.
    pub headers: BTreeMap<String, String>,
    /// The encoded body, if any.
    pub body: Option<RequestBody>,
    /// Passthrough fields from both configuration layers.
    pub extra: Map<String, Value>,
}

/// A body in the form the transport sends it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Text sent verbatim (including encoded JSON).
    Text(String),
    /// URL-encoded form parameters.
    Form(Vec<(String, String)>),
    /// A multipart form.
    Multipart(Multipart),
}

impl RequestBody {
    /// Returns the body text for [`RequestBody::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RequestBody::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Chooses a value from the per-call layer, then the base layer, then the
/// fallback.
///
/// # Examples
///
/// ```
/// use unified_network::resolve::pick;
///
/// assert_eq!(pick(Some(1), Some(2), || 3), 1);
/// assert_eq!(pick(None, Some(2), || 3), 2);
/// assert_eq!(pick(None, None, || 3), 3);
/// ```
pub fn pick<T>(call: Option<T>, base: Option<T>, fallback: impl FnOnce() -> T) -> T {
    call.or(base).unwrap_or_else(fallback)
}

/// Resolves a per-call configuration against a base configuration.
///
/// The processor field is not part of the result; the dispatcher selects it
/// separately.
///
/// # Errors
///
/// Returns [`Error::SerializationFailed`] if a structured body cannot be
/// encoded as JSON.
pub fn resolve(base: &RequestConfig, call: &RequestConfig) -> Result<ResolvedRequest> {
    let RequestConfig {
        method,
        base_url,
        url,
        parameters,
        queries,
        mut headers,
        body,
        extra,
        ..
    } = base.merge(call);

    let url = resolve_url(
        base_url.as_deref(),
        url.as_deref().unwrap_or("/"),
        &parameters,
        &queries,
    );
    let body = normalize_body(body, &mut headers)?;

    Ok(ResolvedRequest {
        method: method.unwrap_or_default(),
        url,
        headers,
        body,
        extra,
    })
}

/// Builds the final URL from its parts.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use std::collections::BTreeMap;
/// use unified_network::resolve::resolve_url;
///
/// let parameters = BTreeMap::from([
///     ("userid".to_string(), json!(23)),
///     ("bookid".to_string(), json!("the-id")),
/// ]);
///
/// let url = resolve_url(None, "test/[userid]/book/[bookid]", &parameters, &BTreeMap::new());
/// assert_eq!(url, "test/23/book/the-id");
/// ```
pub fn resolve_url(
    base_url: Option<&str>,
    url: &str,
    parameters: &BTreeMap<String, Value>,
    queries: &BTreeMap<String, Value>,
) -> String {
    let url = match base_url {
        Some(base_url) => join_paths(base_url, url),
        None => url.to_string(),
    };

    let url = substitute_parameters(url, parameters);
    append_queries(url, queries)
}

/// Replaces every `[name]` in `url` with the string form of its value.
///
/// Keys are processed in ascending order. Replacement is literal and global.
pub fn substitute_parameters(url: String, parameters: &BTreeMap<String, Value>) -> String {
    parameters.iter().fold(url, |url, (name, value)| {
        url.replace(&format!("[{}]", name), &value_to_string(value))
    })
}

/// Appends `queries` to `url` as a URL-encoded query string.
///
/// Entries are emitted in ascending key order. If `url` already carries a
/// query string the entries are joined with `&`.
pub fn append_queries(mut url: String, queries: &BTreeMap<String, Value>) -> String {
    if queries.is_empty() {
        return url;
    }

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in queries {
        serializer.append_pair(key, &value_to_string(value));
    }
    let query = serializer.finish();

    match url.find('?') {
        None => url.push('?'),
        Some(_) if url.ends_with('?') || url.ends_with('&') => {}
        Some(_) => url.push('&'),
    }
    url.push_str(&query);
    url
}

/// Encodes the body for transport.
///
/// JSON objects and arrays are serialized and `Content-Type` is set to
/// `application/json`, replacing any merged value under that exact key.
/// JSON scalars become text, `null` becomes no body, and text and form
/// payloads pass through.
pub fn normalize_body(
    body: Option<Body>,
    headers: &mut BTreeMap<String, String>,
) -> Result<Option<RequestBody>> {
    let body = match body {
        None => return Ok(None),
        Some(body) => body,
    };

    let encoded = match body {
        Body::Json(Value::Null) => return Ok(None),
        Body::Json(value @ (Value::Object(_) | Value::Array(_))) => {
            let text = serde_json::to_string(&value)
                .map_err(|e| Error::SerializationFailed(e.to_string()))?;
            headers.insert(CONTENT_TYPE.to_string(), "application/json".to_string());
            RequestBody::Text(text)
        }
        Body::Json(value) => RequestBody::Text(value_to_string(&value)),
        Body::Text(text) => RequestBody::Text(text),
        Body::Form(pairs) => RequestBody::Form(pairs),
        Body::Multipart(form) => RequestBody::Multipart(form),
    };

    Ok(Some(encoded))
}

/// String form of a configuration value: strings verbatim, everything else
/// as JSON text.
pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(entries: &[(&str, Value)]) -> BTreeMap<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_pick_precedence() {
        assert_eq!(pick(Some("call"), Some("base"), || "default"), "call");
        assert_eq!(pick(None, Some("base"), || "default"), "base");
        assert_eq!(pick(Some("call"), None, || "default"), "call");
        assert_eq!(pick::<&str>(None, None, || "default"), "default");
    }

    #[test]
    fn test_resolve_defaults() {
        let resolved = resolve(&RequestConfig::new(), &RequestConfig::new()).unwrap();

        assert_eq!(resolved.method, Method::Get);
        assert_eq!(resolved.url, "/");
        assert!(resolved.headers.is_empty());
        assert!(resolved.body.is_none());
        assert!(resolved.extra.is_empty());
    }

    #[test]
    fn test_resolve_base_url_without_url() {
        let call = RequestConfig::new().with_base_url("https://www.example.com");
        let resolved = resolve(&RequestConfig::new(), &call).unwrap();

        assert_eq!(resolved.url, "https://www.example.com/");
    }

    #[test]
    fn test_resolve_url_from_base_only() {
        let base = RequestConfig::new().with_url("https://www.example.com");
        let resolved = resolve(&base, &RequestConfig::new()).unwrap();

        assert_eq!(resolved.url, "https://www.example.com");
    }

    #[test]
    fn test_resolve_full_base_config() {
        let base = RequestConfig::new()
            .with_method(Method::Post)
            .with_base_url("https://mirror.example")
            .with_url("test/[userid]/book/[bookid]")
            .with_header("Token", "123")
            .with_parameter("userid", 23)
            .with_parameter("bookid", "the-id")
            .with_query("account", "admin")
            .with_body(json!(["hello", "world"]));

        let resolved = resolve(&base, &RequestConfig::new()).unwrap();

        assert_eq!(resolved.method, Method::Post);
        assert_eq!(
            resolved.url,
            "https://mirror.example/test/23/book/the-id?account=admin"
        );
        assert_eq!(resolved.headers["Token"], "123");
        assert_eq!(resolved.headers[CONTENT_TYPE], "application/json");
        assert_eq!(
            resolved.body,
            Some(RequestBody::Text(r#"["hello","world"]"#.to_string()))
        );
    }

    #[test]
    fn test_resolve_call_overrides_base() {
        let base = RequestConfig::new()
            .with_method(Method::Post)
            .with_base_url("https://mirror.example")
            .with_url("test/[userid]/book/[bookid]")
            .with_header("Token", "123")
            .with_parameter("userid", 23)
            .with_parameter("bookid", "the-id")
            .with_query("account", "admin")
            .with_body(json!(["hello", "world"]));
        let call = RequestConfig::new()
            .with_method(Method::Put)
            .with_url("test/[userid]/book/[bookid]/done/[days]?reason=day")
            .with_header("Token", "33")
            .with_header("Days", "222")
            .with_parameter("userid", 33)
            .with_parameter("bookid", "id-the")
            .with_parameter("days", 5)
            .with_query("account", "accountant")
            .with_query("fails", true)
            .with_body(json!({"says": "hello"}));

        let resolved = resolve(&base, &call).unwrap();

        assert_eq!(resolved.method, Method::Put);
        assert_eq!(
            resolved.url,
            "https://mirror.example/test/33/book/id-the/done/5?reason=day&account=accountant&fails=true"
        );
        assert_eq!(resolved.headers["Token"], "33");
        assert_eq!(resolved.headers["Days"], "222");
        assert_eq!(
            resolved.body,
            Some(RequestBody::Text(r#"{"says":"hello"}"#.to_string()))
        );
    }

    #[test]
    fn test_substitute_parameters_is_global() {
        let url = substitute_parameters(
            "a/[id]/b/[id]/[other]".to_string(),
            &values(&[("id", json!(7))]),
        );
        assert_eq!(url, "a/7/b/7/[other]");
    }

    #[test]
    fn test_substitute_parameters_is_literal() {
        let url = substitute_parameters(
            "a/[x.*]/b".to_string(),
            &values(&[("x.*", json!("dot-star"))]),
        );
        assert_eq!(url, "a/dot-star/b");
    }

    #[test]
    fn test_substitute_parameters_in_key_order() {
        // "a" is substituted first, so its value can introduce a "[b]" placeholder.
        let url = substitute_parameters(
            "[a]".to_string(),
            &values(&[("a", json!("[b]")), ("b", json!("done"))]),
        );
        assert_eq!(url, "done");
    }

    #[test]
    fn test_append_queries_order_and_separator() {
        let queries = values(&[("reason", json!("day")), ("account", json!("admin"))]);

        assert_eq!(
            append_queries("path".to_string(), &queries),
            "path?account=admin&reason=day"
        );
        assert_eq!(
            append_queries("path?x=1".to_string(), &queries),
            "path?x=1&account=admin&reason=day"
        );
        assert_eq!(
            append_queries("path?".to_string(), &queries),
            "path?account=admin&reason=day"
        );
    }

    #[test]
    fn test_append_queries_empty_is_noop() {
        assert_eq!(append_queries("path".to_string(), &BTreeMap::new()), "path");
    }

    #[test]
    fn test_append_queries_encodes_values() {
        let queries = values(&[("q", json!("a b&c=d")), ("k&", json!("v"))]);

        assert_eq!(
            append_queries("search".to_string(), &queries),
            "search?k%26=v&q=a+b%26c%3Dd"
        );
    }

    #[test]
    fn test_query_value_string_forms() {
        let queries = values(&[
            ("flag", json!(true)),
            ("n", json!(5)),
            ("none", Value::Null),
        ]);

        assert_eq!(
            append_queries("p".to_string(), &queries),
            "p?flag=true&n=5&none=null"
        );
    }

    #[test]
    fn test_normalize_structured_body() {
        let mut headers = BTreeMap::from([(CONTENT_TYPE.to_string(), "text/plain".to_string())]);

        let body = normalize_body(Some(Body::Json(json!({"says": "hello"}))), &mut headers).unwrap();

        assert_eq!(body, Some(RequestBody::Text(r#"{"says":"hello"}"#.to_string())));
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn test_normalize_scalar_bodies_pass_through() {
        let mut headers = BTreeMap::new();

        assert_eq!(
            normalize_body(Some(Body::Json(json!("plain"))), &mut headers).unwrap(),
            Some(RequestBody::Text("plain".to_string()))
        );
        assert_eq!(
            normalize_body(Some(Body::Json(json!(42))), &mut headers).unwrap(),
            Some(RequestBody::Text("42".to_string()))
        );
        assert_eq!(
            normalize_body(Some(Body::Text("raw".to_string())), &mut headers).unwrap(),
            Some(RequestBody::Text("raw".to_string()))
        );
        assert_eq!(normalize_body(Some(Body::Json(Value::Null)), &mut headers).unwrap(), None);
        assert_eq!(normalize_body(None, &mut headers).unwrap(), None);
        assert!(headers.is_empty());
    }

    #[test]
    fn test_normalize_form_bodies_pass_through() {
        let mut headers = BTreeMap::new();

        let form = Body::form([("user", "alice"), ("role", "admin")]);
        assert_eq!(
            normalize_body(Some(form), &mut headers).unwrap(),
            Some(RequestBody::Form(vec![
                ("user".to_string(), "alice".to_string()),
                ("role".to_string(), "admin".to_string()),
            ]))
        );

        let multipart = Multipart::new().text("field", "value");
        assert_eq!(
            normalize_body(Some(Body::Multipart(multipart.clone())), &mut headers).unwrap(),
            Some(RequestBody::Multipart(multipart))
        );
        assert!(headers.is_empty());
    }

    #[test]
    fn test_resolve_agrees_with_merge() {
        let base = RequestConfig::new()
            .with_method(Method::Post)
            .with_base_url("https://mirror.example")
            .with_url("a/[x]")
            .with_header("Token", "1")
            .with_parameter("x", 1)
            .with_query("q", "base")
            .with_extra("mode", "cors");
        let call = RequestConfig::new()
            .with_url("b/[x]/[y]")
            .with_header("Days", "2")
            .with_parameter("y", 2)
            .with_query("q", "call")
            .with_body(json!({"k": "v"}));

        let layered = resolve(&base, &call).unwrap();
        let premerged = resolve(&base.merge(&call), &RequestConfig::new()).unwrap();

        assert_eq!(layered, premerged);
        assert_eq!(layered.url, "https://mirror.example/b/1/2?q=call");
        assert_eq!(layered.method, Method::Post);
    }

    #[test]
    fn test_resolve_merges_extra_fields() {
        let base = RequestConfig::new().with_extra("mode", "cors");
        let call = RequestConfig::new().with_extra("redirect", "follow");

        let resolved = resolve(&base, &call).unwrap();
        assert_eq!(resolved.extra["mode"], json!("cors"));
        assert_eq!(resolved.extra["redirect"], json!("follow"));
    }
}
