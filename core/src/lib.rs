//! Namespaced remote-method client core.
//!
//! # Overview
//! Lets a caller address a remote HTTP API through namespace chains:
//! `api.namespace("foo").child("bar").invoke("baz", args)` becomes one call
//! to `/foo/bar/baz`. The chain only builds the path; a `Dispatcher`
//! performs the call.
//!
//! # Design
//! - `Namespace` nodes borrow their parent and the shared dispatcher, so a
//!   chain is a transient expression with nothing to clean up.
//! - Path depth is capped at `MAX_NAMESPACE_DEPTH` segments and checked
//!   before anything is sent.
//! - `RestDispatcher` follows the host-does-IO pattern: it builds
//!   `HttpRequest` values and parses `HttpResponse` values, and a pluggable
//!   `Transport` does the actual round-trip.
//!
//! ```
//! use nsapi_core::{Api, ApiError, CallArgs, ClientConfig, HttpRequest, HttpResponse, RestDispatcher};
//! use serde_json::json;
//!
//! let transport = |request: HttpRequest| -> Result<HttpResponse, ApiError> {
//!     Ok(HttpResponse {
//!         status: 200,
//!         headers: Vec::new(),
//!         body: json!({"result": "success", "data": request.url}).to_string(),
//!     })
//! };
//! let dispatcher = RestDispatcher::new(ClientConfig::new("http://api.test")?, transport);
//! let api = Api::new(&dispatcher);
//!
//! let url = api.namespace("Users").invoke("get", CallArgs::new().param("id", 5))?;
//! assert_eq!(url, "http://api.test/Users/get?id=5");
//! # Ok::<(), ApiError>(())
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod namespace;
pub mod rest;
pub mod types;

pub use config::ClientConfig;
pub use dispatcher::Dispatcher;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use namespace::{Api, Namespace, MAX_NAMESPACE_DEPTH};
pub use rest::{RestDispatcher, Transport};
pub use types::{CallArgs, ResponseEnvelope, METHOD_TYPE_KEY};
