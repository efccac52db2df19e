use std::{collections::HashMap, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// `{"result": "success", "data": ...}` or `{"result": "error", "error": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub result: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            result: "success".to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: "error".to_string(),
            data: None,
            error: Some(message.into()),
        }
    }
}

pub type Counters = Arc<RwLock<HashMap<String, i64>>>;

type Reply = (StatusCode, Json<Envelope>);

pub fn app() -> Router {
    let counters: Counters = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/{*path}", any(call_method))
        .with_state(counters)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn call_method(
    State(counters): State<Counters>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Reply {
    let params = match collect_params(query, &body) {
        Ok(params) => params,
        Err(reply) => return reply,
    };
    debug!(%method, %path, "remote method called");

    match path.as_str() {
        "Misc/Debug/echo" => ok(json!({
            "request_id": Uuid::new_v4(),
            "method": method.as_str(),
            "path": format!("/{path}"),
            "params": params,
        })),
        "Misc/Debug/fail" => fail(StatusCode::BAD_REQUEST, "requested failure"),
        "Misc/Debug/soft_fail" => fail(StatusCode::OK, "requested soft failure"),
        "Counter/increment" => increment(&counters, &method, &params).await,
        "Counter/get" => {
            let name = counter_name(&params);
            let value = counters.read().await.get(&name).copied().unwrap_or(0);
            ok(json!({"name": name, "value": value}))
        }
        _ => {
            info!(%path, "unknown remote method");
            fail(StatusCode::NOT_FOUND, format!("unknown method /{path}"))
        }
    }
}

async fn increment(counters: &Counters, method: &Method, params: &Map<String, Value>) -> Reply {
    if *method != Method::POST {
        return fail(StatusCode::METHOD_NOT_ALLOWED, "Counter/increment requires POST");
    }
    let by = match params.get("by") {
        None => 1,
        Some(value) => match value.as_i64() {
            Some(by) => by,
            None => return fail(StatusCode::BAD_REQUEST, "`by` must be an integer"),
        },
    };
    let name = counter_name(params);
    let mut counters = counters.write().await;
    let value = counters.entry(name.clone()).or_insert(0);
    *value += by;
    ok(json!({"name": name, "value": *value}))
}

/// Query pairs for every method, merged with the JSON object body if one
/// was sent.
fn collect_params(query: HashMap<String, String>, body: &Bytes) -> Result<Map<String, Value>, Reply> {
    let mut params: Map<String, Value> = query
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect();
    if body.is_empty() {
        return Ok(params);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => {
            params.extend(fields);
            Ok(params)
        }
        Ok(_) => Err(fail(StatusCode::BAD_REQUEST, "body must be a JSON object")),
        Err(e) => Err(fail(StatusCode::BAD_REQUEST, format!("malformed JSON body: {e}"))),
    }
}

fn counter_name(params: &Map<String, Value>) -> String {
    params
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("default")
        .to_string()
}

fn ok(data: Value) -> Reply {
    (StatusCode::OK, Json(Envelope::success(data)))
}

fn fail(status: StatusCode, message: impl Into<String>) -> Reply {
    (status, Json(Envelope::error(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_error() {
        let json = serde_json::to_value(Envelope::success(json!({"a": 1}))).unwrap();
        assert_eq!(json, json!({"result": "success", "data": {"a": 1}}));
    }

    #[test]
    fn error_envelope_omits_data() {
        let json = serde_json::to_value(Envelope::error("boom")).unwrap();
        assert_eq!(json, json!({"result": "error", "error": "boom"}));
    }

    #[test]
    fn query_params_are_strings() {
        let query = HashMap::from([("id".to_string(), "5".to_string())]);
        let params = collect_params(query, &Bytes::new()).unwrap();
        assert_eq!(params["id"], "5");
    }

    #[test]
    fn body_fields_merge_over_query() {
        let query = HashMap::from([("id".to_string(), "5".to_string())]);
        let body = Bytes::from_static(br#"{"id": 6, "x": true}"#);
        let params = collect_params(query, &body).unwrap();
        assert_eq!(params["id"], 6);
        assert_eq!(params["x"], true);
    }

    #[test]
    fn non_object_body_is_rejected() {
        let (status, Json(envelope)) = collect_params(HashMap::new(), &Bytes::from_static(b"[1]")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(envelope.result, "error");
    }

    #[test]
    fn malformed_body_is_rejected() {
        let (status, _) = collect_params(HashMap::new(), &Bytes::from_static(b"{nope")).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn counter_name_defaults() {
        assert_eq!(counter_name(&Map::new()), "default");
        let mut params = Map::new();
        params.insert("name".to_string(), json!("hits"));
        assert_eq!(counter_name(&params), "hits");
    }
}
