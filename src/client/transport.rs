//! The single seam every backend exchange goes through.
//!
//! Clients build a [`Request`], hand it to a [`Transport`], and interpret the
//! [`Response`] themselves. [`HttpTransport`] is the reqwest implementation;
//! tests substitute an in-memory one.

use std::future::Future;

use reqwest::multipart;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::error::{Result, WattCompareError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Text(String),
    File {
        bytes: Vec<u8>,
        filename: String,
        mime: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Multipart(Vec<(String, FormField)>),
    Json(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Body,
}

impl Request {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            body: Body::Empty,
        }
    }

    pub fn post_multipart(path: &str, fields: Vec<(String, FormField)>) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Body::Multipart(fields),
        }
    }

    pub fn post_json(path: &str, value: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Body::Json(value),
        }
    }

    /// Text value of a multipart field, if present.
    pub fn form_text(&self, name: &str) -> Option<&str> {
        match &self.body {
            Body::Multipart(fields) => fields.iter().find_map(|(k, v)| match v {
                FormField::Text(t) if k == name => Some(t.as_str()),
                _ => None,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; `None` when it is not JSON at all.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Fail with a `Status` error naming `action` unless 2xx. A JSON
    /// `error` string in the body is carried along as the detail.
    pub fn require_success(self, action: &str) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let detail = self
            .json()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string));
        match detail {
            Some(detail) => {
                error!("{} returned HTTP {}: {}", action, self.status, detail);
                Err(WattCompareError::status_with_detail(action, self.status, detail))
            }
            None => {
                error!("{} returned HTTP {}", action, self.status);
                Err(WattCompareError::status(action, self.status))
            }
        }
    }
}

/// Performs one request/response exchange. No retries, no timeouts.
pub trait Transport: Send + Sync {
    fn send(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

/// reqwest-backed transport against a single backend origin.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WattCompareError::Config(format!("invalid base URL '{}': {}", base_url, e)))?;
        let client = reqwest::Client::builder()
            .user_agent("WattCompare/1.0")
            .build()
            .map_err(|e| WattCompareError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| WattCompareError::Config(format!("invalid path '{}': {}", path, e)))
    }
}

fn build_form(fields: Vec<(String, FormField)>) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, field) in fields {
        form = match field {
            FormField::Text(text) => form.text(name, text),
            FormField::File {
                bytes,
                filename,
                mime,
            } => {
                let part = multipart::Part::bytes(bytes)
                    .file_name(filename)
                    .mime_str(&mime)
                    .map_err(|e| WattCompareError::Image(format!("bad MIME type '{}': {}", mime, e)))?;
                form.part(name, part)
            }
        };
    }
    Ok(form)
}

impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = self.url_for(&request.path)?;
        let action = request.path.clone();
        debug!("{:?} {}", request.method, url);

        let builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        let builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            error!("Request to {} failed: {}", action, e);
            WattCompareError::transport(&action, e)
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| WattCompareError::transport(&action, format!("failed to read body: {}", e)))?
            .to_vec();
        debug!("{} -> HTTP {} ({} bytes)", action, status, body.len());

        Ok(Response { status, body })
    }
}
