//! `Dispatcher` that maps resolved method paths onto HTTP round-trips.
//!
//! # Design
//! `RestDispatcher` never opens a socket itself. `build_request` turns
//! `(path, args, kind)` into an `HttpRequest`, the caller-supplied
//! `Transport` executes it, and `parse_response` interprets the
//! `HttpResponse`. Both halves are public so hosts that drive their own I/O
//! can skip the `Transport` entirely.

use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

use crate::config::ClientConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::ResponseEnvelope;

/// Executes one `HttpRequest` against the network.
///
/// Failures to complete the round-trip map to `ApiError::Transport`; HTTP
/// error statuses are data and must come back as an `HttpResponse`.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

#[derive(Debug, Clone)]
pub struct RestDispatcher<T> {
    config: ClientConfig,
    transport: T,
}

impl<T: Transport> RestDispatcher<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_request(
        &self,
        path: &str,
        args: &Map<String, Value>,
        kind: HttpMethod,
    ) -> Result<HttpRequest> {
        let segments = path_segments(path)?;
        let mut url = Url::parse(self.config.base_url())
            .map_err(|e| ApiError::InvalidConfig(format!("base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::InvalidConfig(format!("base url `{}` cannot take a path", self.config.base_url()))
            })?
            .pop_if_empty()
            .extend(segments);

        let mut headers = Vec::new();
        let mut body = None;
        if kind.has_body() {
            let json = serde_json::to_string(args)
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            headers.push(("content-type".to_string(), "application/json".to_string()));
            body = Some(json);
        } else if !args.is_empty() {
            url.set_query(Some(&encode_query(args)));
        }

        headers.extend(self.config.headers().iter().cloned());
        Ok(HttpRequest {
            method: kind,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Interpret a response for the call to `path`.
    ///
    /// Non-2xx statuses and `{"result": "error"}` envelopes become
    /// `CallMethodFailed`. A success envelope yields its `data`; any other
    /// JSON body is returned whole and an empty body yields `null`.
    pub fn parse_response(&self, path: &str, response: HttpResponse) -> Result<Value> {
        if !response.is_success() {
            let message = serde_json::from_str::<ResponseEnvelope>(&response.body)
                .map(|envelope| envelope.error_message())
                .unwrap_or(response.body);
            return Err(ApiError::CallMethodFailed {
                path: path.to_string(),
                status: response.status,
                message,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;

        let is_envelope = value.get("result").is_some_and(Value::is_string);
        if !is_envelope {
            return Ok(value);
        }
        let envelope: ResponseEnvelope = serde_json::from_value(value)
            .map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        if envelope.is_error() {
            return Err(ApiError::CallMethodFailed {
                path: path.to_string(),
                status: response.status,
                message: envelope.error_message(),
            });
        }
        Ok(envelope.data.unwrap_or(Value::Null))
    }
}

impl<T: Transport> Dispatcher for RestDispatcher<T> {
    fn call_method(&self, path: &str, args: Map<String, Value>, kind: HttpMethod) -> Result<Value> {
        let request = self.build_request(path, &args, kind)?;
        debug!(%path, %kind, url = %request.url, "dispatching remote call");
        let response = self.transport.execute(request)?;
        let status = response.status;
        self.parse_response(path, response).inspect_err(|e| {
            warn!(%path, %kind, status, error = %e, "remote call failed");
        })
    }
}

/// Split a `/a/b/method` path into its segments. Each one is percent-encoded
/// when appended to the base URL, so only empty and dot segments need
/// rejecting here.
fn path_segments(path: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = path.strip_prefix('/').unwrap_or(path).split('/').collect();
    for segment in &segments {
        let reason = match *segment {
            "" => "segment is empty",
            "." | ".." => "dot segments are not allowed",
            _ => continue,
        };
        return Err(ApiError::InvalidSegment {
            segment: (*segment).to_string(),
            reason,
        });
    }
    Ok(segments)
}

/// Strings are sent raw; every other value as compact JSON.
fn encode_query(args: &Map<String, Value>) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in args {
        match value {
            Value::String(s) => serializer.append_pair(key, s),
            other => serializer.append_pair(key, &other.to_string()),
        };
    }
    serializer.finish()
}
