//! API Data Models
//!
//! Request and response types of the HTTP layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Error body: `{"message": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiError {
    /// Human readable message
    pub message: String,
}

impl ApiError {
    /// Create an error body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Parsed HTTP request
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// Method, e.g. `GET`
    pub method: String,
    /// Request target including any query string
    pub target: String,
    /// Headers with lowercase names
    pub headers: HashMap<String, String>,
    /// Raw body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Request without headers or body
    pub fn new(method: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            target: target.into(),
            ..Default::default()
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Target without the query string
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// Header value by lowercase name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// HTTP response produced by the router
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code
    pub status: u16,
    /// Content-Type header
    pub content_type: String,
    /// Body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// JSON response
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self {
                status,
                content_type: "application/json; charset=utf-8".to_string(),
                body,
            },
            Err(e) => {
                tracing::error!("Failed to encode response: {}", e);
                Self::plain(500, "Internal Server Error")
            }
        }
    }

    /// `{message}` error response
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, &ApiError::new(message))
    }

    /// Plain text response
    pub fn plain(status: u16, body: &str) -> Self {
        Self::bytes(status, "text/plain; charset=utf-8", body.as_bytes().to_vec())
    }

    /// Raw bytes with an explicit content type
    pub fn bytes(status: u16, content_type: impl Into<String>, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.into(),
            body,
        }
    }

    /// 404 with the default message
    pub fn not_found() -> Self {
        Self::error(404, "Not found")
    }

    /// Decode a JSON body; test and client helper
    pub fn json_body<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

/// Reason phrase for the status codes this server emits
pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
