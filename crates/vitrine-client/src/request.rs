//! Request and response descriptors passed through the middleware pipeline.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// Outgoing request before credentials are attached.
///
/// Credentials are never captured at construction: the request middleware
/// reads them from the client context when the request is dispatched.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the configured base URL, starting with `/`.
    pub path: String,
    /// Query parameters, appended in order and URL-encoded at dispatch.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Request with no query, headers or body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    /// `GET path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `DELETE path`.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Attach a body.
    #[must_use]
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    /// Merge caller-supplied options (query and headers).
    #[must_use]
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.query.extend(options.query);
        self.headers.extend(options.headers);
        self
    }
}

/// Optional per-call request configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra query parameters.
    pub query: Vec<(String, String)>,
    /// Extra headers.
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Body of an [`ApiRequest`].
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(Value),
    /// `multipart/form-data` payload.
    Multipart(MultipartForm),
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// One named part of a [`MultipartForm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    /// Plain text value.
    Text(String),
    /// File upload.
    File {
        /// File name reported to the backend.
        file_name: String,
        /// MIME type, when known.
        content_type: Option<String>,
        /// File contents.
        bytes: Bytes,
    },
}

/// Cloneable multipart payload, converted into a transport form at dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<(String, MultipartPart)>,
}

impl MultipartForm {
    /// Empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a text part.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts
            .push((name.into(), MultipartPart::Text(value.into())));
        self
    }

    /// Append a file part.
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.parts.push((
            name.into(),
            MultipartPart::File {
                file_name: file_name.into(),
                content_type,
                bytes: bytes.into(),
            },
        ));
        self
    }

    /// Parts in submission order.
    #[must_use]
    pub fn parts(&self) -> &[(String, MultipartPart)] {
        &self.parts
    }

    pub(crate) fn into_form(self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, part) in self.parts {
            form = match part {
                MultipartPart::Text(value) => form.text(name, value),
                MultipartPart::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.to_vec()).file_name(file_name);
                    if let Some(mime) = content_type {
                        file = file.mime_str(&mime)?;
                    }
                    form.part(name, file)
                }
            };
        }
        Ok(form)
    }
}

/// Successful response handed back through the response middleware.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw body.
    pub body: Bytes,
    /// Request path, kept for error context.
    pub path: String,
}

impl ApiResponse {
    /// Decode the body as JSON. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] when the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(body: &'static [u8]) -> ApiResponse {
        ApiResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::from_static(body),
            path: "/products/5".to_string(),
        }
    }

    #[test]
    fn empty_body_decodes_as_null() {
        let value: Value = response(b"").json().expect("null");
        assert_eq!(value, Value::Null);
        let optional: Option<u32> = response(b" \n").json().expect("none");
        assert_eq!(optional, None);
    }

    #[test]
    fn mismatched_body_reports_decode_error_with_path() {
        let err = response(b"{\"id\": \"x\"}")
            .json::<Vec<u32>>()
            .expect_err("not a list");
        assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "/products/5"));
    }

    #[test]
    fn options_merge_into_request() {
        let request = ApiRequest::get("/products").query("page", "1").options(
            RequestOptions::new()
                .query("limit", "20")
                .header(
                    HeaderName::from_static("x-trace"),
                    HeaderValue::from_static("abc"),
                ),
        );
        assert_eq!(
            request.query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string())
            ]
        );
        assert_eq!(request.headers.get("x-trace").map(HeaderValue::as_bytes), Some(&b"abc"[..]));
    }

    #[test]
    fn multipart_form_keeps_part_order() {
        let form = MultipartForm::new()
            .text("title", "Verão")
            .file("image", "a.png", Some("image/png".into()), vec![1_u8, 2, 3]);
        let names: Vec<&str> = form.parts().iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["title", "image"]);
        assert!(form.clone().into_form().is_ok());

        let body = RequestBody::from(json!({"name": "x"}));
        assert!(matches!(body, RequestBody::Json(_)));
    }
}
