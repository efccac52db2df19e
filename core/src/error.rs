//! Error types for the namespaced API client.
//!
//! # Design
//! Misuse of the namespace chain (`InvalidAction`, `NamespaceDepthExceeded`,
//! bad arguments) is detected before any request is built, so callers can
//! tell it apart from `CallMethodFailed`, which means the remote side
//! answered and refused.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by namespace nodes, the root `Api` and dispatchers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A property was assigned on a namespace node. Nodes are read-only.
    #[error("invalid action: cannot set property `{name}` on a namespace")]
    InvalidAction { name: String },

    /// The resolved path has more segments than allowed.
    #[error("namespace depth {depth} exceeds the maximum of {max}")]
    NamespaceDepthExceeded { depth: usize, max: usize },

    /// A namespace or method name cannot be used as a path segment.
    #[error("invalid path segment `{segment}`: {reason}")]
    InvalidSegment {
        segment: String,
        reason: &'static str,
    },

    /// The remote call completed but did not succeed.
    #[error("call to {path} failed (HTTP {status}): {message}")]
    CallMethodFailed {
        path: String,
        status: u16,
        message: String,
    },

    /// The first positional argument cannot be used as a payload.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// `method_type` did not name a known HTTP method.
    #[error("unknown request kind: {0}")]
    InvalidRequestKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transport could not complete the round-trip.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The response body could not be deserialized.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),
}
