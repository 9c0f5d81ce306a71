//! Uniform response shape.
//!
//! Every call through a [`Dispatcher`](crate::Dispatcher) yields a
//! [`UnifiedResponse`], whatever the payload type and whether or not the
//! transport succeeded. Raw processor replies are normalized by
//! [`UnifiedResponse::from_raw`].

use crate::{processor::RawResponse, Error, Result};
use http::HeaderMap;
use serde_json::Value;

/// Status reported when no usable response was obtained.
pub const FAILURE_STATUS: i32 = -1;

/// The body of a [`UnifiedResponse`].
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseData {
    /// A body parsed from an `application/json` response.
    Json(Value),
    /// Any other body, as text.
    Text(String),
}

impl ResponseData {
    /// Returns the parsed JSON value, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseData::Json(value) => Some(value),
            ResponseData::Text(_) => None,
        }
    }

    /// Returns the text, if this is a text body.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseData::Text(text) => Some(text),
            ResponseData::Json(_) => None,
        }
    }
}

/// The normalized result of a request.
///
/// # Examples
///
/// ```
/// use unified_network::{RawResponse, UnifiedResponse};
///
/// let raw = RawResponse::new(200, r#"{"path":"users"}"#)
///     .with_header("content-type", "application/json; charset=utf-8")
///     .unwrap();
///
/// let response = UnifiedResponse::from_raw(raw).unwrap();
/// assert_eq!(response.status, 200);
/// assert_eq!(response.json().unwrap()["path"], "users");
///
/// let failed = UnifiedResponse::failed();
/// assert_eq!(failed.status, -1);
/// assert!(failed.data.is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UnifiedResponse {
    /// The HTTP status code, or [`FAILURE_STATUS`].
    pub status: i32,

    /// The response headers, with lower-case names.
    pub headers: HeaderMap,

    /// The response body. Absent for failures and for empty JSON bodies.
    pub data: Option<ResponseData>,
}

impl UnifiedResponse {
    /// The response returned when the transport failed or the reply could not
    /// be interpreted.
    pub fn failed() -> Self {
        Self {
            status: FAILURE_STATUS,
            headers: HeaderMap::new(),
            data: None,
        }
    }

    /// Normalizes a raw processor reply.
    ///
    /// For 2xx replies whose `content-type` contains `application/json`
    /// (case-insensitively) the body is parsed as JSON; an empty body yields
    /// no data. All other replies keep the body as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] if a 2xx JSON reply does not
    /// parse.
    pub fn from_raw(raw: RawResponse) -> Result<Self> {
        let RawResponse {
            status,
            headers,
            body,
        } = raw;

        let success = (200..300).contains(&status);
        let data = if success && is_json(&headers) {
            if body.is_empty() {
                None
            } else {
                match serde_json::from_str::<Value>(&body) {
                    Ok(value) => Some(ResponseData::Json(value)),
                    Err(e) => {
                        tracing::error!(
                            error = %e,
                            raw_response = %body,
                            "Failed to deserialize response"
                        );

                        return Err(Error::DeserializationFailed {
                            raw_response: body,
                            serde_error: e.to_string(),
                            status,
                        });
                    }
                }
            }
        } else {
            Some(ResponseData::Text(body))
        };

        Ok(Self {
            status: i32::from(status),
            headers,
            data,
        })
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` if the request never produced a usable response.
    pub fn is_failure(&self) -> bool {
        self.status <= 0
    }

    /// Returns the parsed JSON body, if any.
    pub fn json(&self) -> Option<&Value> {
        self.data.as_ref()?.as_json()
    }

    /// Returns the text body, if any.
    pub fn text(&self) -> Option<&str> {
        self.data.as_ref()?.as_text()
    }

    /// Returns a header value by name, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}
