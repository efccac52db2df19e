//! The boundary between namespace chains and the network.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::error::Result;
use crate::http::HttpMethod;

/// Performs the remote call for a fully resolved method path.
///
/// One handle is shared by every node of a chain and possibly by chains on
/// several threads, hence the `Send + Sync` bound. Implementations return
/// `ApiError::CallMethodFailed` when the remote side did not succeed.
pub trait Dispatcher: Send + Sync {
    fn call_method(&self, path: &str, args: Map<String, Value>, kind: HttpMethod) -> Result<Value>;
}

impl<D: Dispatcher + ?Sized> Dispatcher for &D {
    fn call_method(&self, path: &str, args: Map<String, Value>, kind: HttpMethod) -> Result<Value> {
        (**self).call_method(path, args, kind)
    }
}

impl<D: Dispatcher + ?Sized> Dispatcher for Box<D> {
    fn call_method(&self, path: &str, args: Map<String, Value>, kind: HttpMethod) -> Result<Value> {
        (**self).call_method(path, args, kind)
    }
}

impl<D: Dispatcher + ?Sized> Dispatcher for Arc<D> {
    fn call_method(&self, path: &str, args: Map<String, Value>, kind: HttpMethod) -> Result<Value> {
        (**self).call_method(path, args, kind)
    }
}
