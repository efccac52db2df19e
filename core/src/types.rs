//! Call arguments and the response envelope.
//!
//! # Design
//! `CallArgs` is the explicit form of a dynamic call's argument list: an
//! ordered list of positional values plus named values. The first
//! positional value is "the" argument bag; `method_type` is a named value
//! that never reaches the remote side.
//!
//! `ResponseEnvelope` mirrors the mock server's `{"result": ...}` wrapper but
//! is defined independently; integration tests catch schema drift.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::http::HttpMethod;

/// Named argument selecting the request kind of a call.
pub const METHOD_TYPE_KEY: &str = "method_type";

/// Arguments of one terminal call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    positional: Vec<Value>,
    named: Map<String, Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument, replacing any previous value for `key`.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    pub fn method_type(self, kind: HttpMethod) -> Self {
        self.param(METHOD_TYPE_KEY, kind.as_str())
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &Map<String, Value> {
        &self.named
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Split the arguments into the payload forwarded to the dispatcher and
    /// the request kind.
    ///
    /// `method_type` is removed first. A first positional object becomes the
    /// payload (`null` counts as empty); without positional arguments the
    /// remaining named arguments are the payload.
    pub fn into_call(self) -> Result<(Map<String, Value>, HttpMethod)> {
        let mut named = self.named;
        let kind = match named.remove(METHOD_TYPE_KEY) {
            None | Some(Value::Null) => HttpMethod::default(),
            Some(Value::String(kind)) => kind.parse()?,
            Some(other) => return Err(ApiError::InvalidRequestKind(other.to_string())),
        };

        let payload = match self.positional.into_iter().next() {
            Some(Value::Object(map)) => map,
            Some(Value::Null) => Map::new(),
            Some(other) => {
                return Err(ApiError::InvalidArguments(format!(
                    "first positional argument must be an object, got {other}"
                )))
            }
            None => named,
        };
        Ok((payload, kind))
    }
}

/// Objects split into positional (all-digit keys, in index order, only when
/// index 0 is present) and named entries; arrays are positional; any other
/// non-null value is the single positional argument.
impl From<Value> for CallArgs {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::default(),
            Value::Array(positional) => Self {
                positional,
                named: Map::new(),
            },
            Value::Object(map) => {
                let mut indexed = Vec::new();
                let mut named = Map::new();
                for (key, value) in map {
                    match positional_index(&key) {
                        Some(index) => indexed.push((index, key, value)),
                        None => {
                            named.insert(key, value);
                        }
                    }
                }
                // Without an index 0 there is no first argument to unwrap.
                if !indexed.iter().any(|(index, _, _)| *index == 0) {
                    named.extend(indexed.into_iter().map(|(_, key, value)| (key, value)));
                    return Self {
                        positional: Vec::new(),
                        named,
                    };
                }
                indexed.sort_by_key(|(index, _, _)| *index);
                Self {
                    positional: indexed.into_iter().map(|(_, _, value)| value).collect(),
                    named,
                }
            }
            other => Self {
                positional: vec![other],
                named: Map::new(),
            },
        }
    }
}

/// Keys made only of ASCII digits address positional arguments.
fn positional_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

impl From<Map<String, Value>> for CallArgs {
    fn from(named: Map<String, Value>) -> Self {
        Self {
            positional: Vec::new(),
            named,
        }
    }
}

/// The `{"result": "success" | "error", ...}` wrapper around API answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    pub fn is_error(&self) -> bool {
        self.result.eq_ignore_ascii_case("error")
    }

    /// Human-readable error text; string errors are used verbatim.
    pub fn error_message(&self) -> String {
        match &self.error {
            Some(Value::String(message)) => message.clone(),
            Some(other) => other.to_string(),
            None => format!("remote returned result `{}`", self.result),
        }
    }
}
