//! HTTP response wrapper.

use crate::{Result, TransportError};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use specio_spec::DocumentFormat;

/// HTTP response wrapper.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    url: url::Url,
}

impl Response {
    /// Assemble a response from its parts.
    ///
    /// Custom [`Transport`](crate::Transport) implementations use this to
    /// hand back what they received.
    pub fn from_parts(status: StatusCode, headers: HeaderMap, body: Bytes, url: url::Url) -> Self {
        Self {
            status,
            headers,
            body,
            url,
        }
    }

    /// Create a response from a reqwest response.
    pub(crate) async fn from_reqwest(response: reqwest::Response) -> reqwest::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let body = response.bytes().await?;

        Ok(Self {
            status,
            headers,
            body,
            url,
        })
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Check if the response was successful (2xx).
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response URL.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Get the response body as bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Get the response body as text.
    ///
    /// Invalid UTF-8 sequences are replaced rather than rejected.
    pub fn text(&self) -> Result<String> {
        Ok(String::from_utf8_lossy(&self.body).into_owned())
    }

    /// Decoded JSON body.
    ///
    /// `Null` when the body is empty or the content type is not JSON.
    pub fn body(&self) -> Result<serde_json::Value> {
        if self.body.is_empty() || !self.is_json() {
            return Ok(serde_json::Value::Null);
        }
        self.json()
    }

    fn is_json(&self) -> bool {
        self.content_type()
            .and_then(DocumentFormat::from_content_type)
            == Some(DocumentFormat::Json)
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| TransportError::Json(e.to_string()))
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Turn a 4xx/5xx response into [`TransportError::Response`].
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_client_error() || self.status.is_server_error() {
            let message = self
                .status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string();
            let body = String::from_utf8_lossy(&self.body).into_owned();
            Err(TransportError::Response {
                status: self.status.as_u16(),
                message,
                body,
            })
        } else {
            Ok(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(status: u16, content_type: &str, body: &'static [u8]) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_TYPE, content_type.parse().unwrap());
        Response::from_parts(
            StatusCode::from_u16(status).unwrap(),
            headers,
            Bytes::from_static(body),
            url::Url::parse("http://localhost/").unwrap(),
        )
    }

    fn response(status: u16, body: &'static str) -> Response {
        typed(status, "application/json", body.as_bytes())
    }

    #[test]
    fn test_text_and_body() {
        let res = response(200, r#"{"name":"doggie"}"#);
        assert_eq!(res.text().unwrap(), r#"{"name":"doggie"}"#);
        assert_eq!(res.body().unwrap()["name"], "doggie");
    }

    #[test]
    fn test_empty_body_is_null() {
        let res = response(204, "");
        assert_eq!(res.body().unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_non_json_content_type_body_is_null() {
        let res = typed(200, "text/plain; charset=utf-8", b"Get Resource: foo");
        assert_eq!(res.body().unwrap(), serde_json::Value::Null);
        assert_eq!(res.text().unwrap(), "Get Resource: foo");
    }

    #[test]
    fn test_vendor_json_content_type_is_decoded() {
        let res = typed(200, "application/vnd.api+json", br#"{"id":1}"#);
        assert_eq!(res.body().unwrap()["id"], 1);
    }

    #[test]
    fn test_malformed_json_body_is_rejected() {
        let res = response(200, "Get Resource: foo");
        assert!(matches!(res.body(), Err(TransportError::Json(_))));
    }

    #[test]
    fn test_text_replaces_invalid_utf8() {
        let res = typed(200, "text/plain", b"caf\xe9 ok");
        assert_eq!(res.text().unwrap(), "caf\u{FFFD} ok");
    }

    #[test]
    fn test_error_for_status() {
        let err = response(404, "missing").error_for_status().unwrap_err();
        match err {
            TransportError::Response {
                status,
                message,
                body,
            } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Not Found");
                assert_eq!(body, "missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(response(201, "").error_for_status().is_ok());
    }
}
