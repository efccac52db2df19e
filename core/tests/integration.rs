//! Namespace chains against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives it through `Api`
//! and `RestDispatcher` with a ureq-backed `Transport`. Validates path
//! resolution, argument placement and error mapping over real HTTP.

use std::net::SocketAddr;

use nsapi_core::{
    Api, ApiError, CallArgs, ClientConfig, HttpMethod, HttpRequest, HttpResponse, RestDispatcher,
    Transport,
};
use serde_json::json;

/// Executes requests with ureq, returning 4xx/5xx responses as data so the
/// dispatcher interprets the status itself.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let agent = &self.agent;
        let result = match (req.method, req.body) {
            (HttpMethod::Get, _) => agent.get(&req.url).call(),
            (HttpMethod::Delete, _) => agent.delete(&req.url).call(),
            (HttpMethod::Post, Some(body)) => agent
                .post(&req.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Post, None) => agent.post(&req.url).send_empty(),
            (HttpMethod::Put, Some(body)) => agent
                .put(&req.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Put, None) => agent.put(&req.url).send_empty(),
            (HttpMethod::Patch, Some(body)) => agent
                .patch(&req.url)
                .content_type("application/json")
                .send(body.as_bytes()),
            (HttpMethod::Patch, None) => agent.patch(&req.url).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.body_mut().read_to_string().unwrap_or_default();
        Ok(HttpResponse {
            status,
            headers: Vec::new(),
            body,
        })
    }
}

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

fn dispatcher(addr: SocketAddr) -> RestDispatcher<UreqTransport> {
    let config = ClientConfig::new(&format!("http://{addr}/")).unwrap();
    RestDispatcher::new(config, UreqTransport::new())
}

#[test]
fn namespace_calls_round_trip() {
    let dispatcher = dispatcher(start_server());
    let api = Api::new(&dispatcher);
    let debug = api.namespace("Misc");
    let debug = debug.child("Debug");

    // Step 1: GET with named args lands in the query string.
    let data = debug.invoke("echo", json!({"id": 5, "name": "a b"})).unwrap();
    assert_eq!(data["method"], "GET");
    assert_eq!(data["path"], "/Misc/Debug/echo");
    assert_eq!(data["params"], json!({"id": "5", "name": "a b"}));

    // Step 2: method_type POST sends the first positional object as body.
    let data = debug
        .invoke("echo", json!({"method_type": "POST", "0": {"x": 1}}))
        .unwrap();
    assert_eq!(data["method"], "POST");
    assert_eq!(data["params"], json!({"x": 1}));

    // Step 3: PATCH and DELETE through the builder.
    let data = debug
        .invoke(
            "echo",
            CallArgs::new().method_type(HttpMethod::Patch).arg(json!({"y": [1, 2]})),
        )
        .unwrap();
    assert_eq!(data["method"], "PATCH");
    assert_eq!(data["params"], json!({"y": [1, 2]}));

    let data = debug
        .invoke("echo", CallArgs::new().method_type(HttpMethod::Delete).param("id", "z"))
        .unwrap();
    assert_eq!(data["method"], "DELETE");
    assert_eq!(data["params"], json!({"id": "z"}));

    // Step 4: empty args send a bare GET.
    let data = debug.invoke("echo", CallArgs::new()).unwrap();
    assert_eq!(data["method"], "GET");
    assert_eq!(data["params"], json!({}));
}

#[test]
fn remote_failures_map_to_call_method_failed() {
    let dispatcher = dispatcher(start_server());
    let api = Api::new(&dispatcher);

    let err = api
        .namespace("Misc")
        .child("Debug")
        .invoke("fail", CallArgs::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::CallMethodFailed { ref path, status: 400, ref message }
            if path == "/Misc/Debug/fail" && message == "requested failure"
    ));

    let err = api
        .namespace("Misc")
        .child("Debug")
        .invoke("soft_fail", CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::CallMethodFailed { status: 200, .. }));

    let err = api.invoke("nowhere", CallArgs::new()).unwrap_err();
    assert!(matches!(err, ApiError::CallMethodFailed { status: 404, .. }));

    let err = api
        .namespace("Counter")
        .invoke("increment", CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::CallMethodFailed { status: 405, .. }));
}

#[test]
fn counter_state_persists_across_chains() {
    let dispatcher = dispatcher(start_server());
    let api = Api::new(&dispatcher);
    let post = || CallArgs::new().method_type(HttpMethod::Post);

    let data = api
        .namespace("Counter")
        .invoke("increment", post().arg(json!({"name": "hits"})))
        .unwrap();
    assert_eq!(data["value"], 1);

    let data = api
        .namespace("Counter")
        .invoke("increment", post().param("name", "hits").param("by", 9))
        .unwrap();
    assert_eq!(data["value"], 10);

    let data = api
        .namespace("Counter")
        .invoke("get", CallArgs::new().param("name", "hits"))
        .unwrap();
    assert_eq!(data, json!({"name": "hits", "value": 10}));
}

#[test]
fn too_deep_chain_fails_before_any_request() {
    let addr = start_server();
    let calls = std::sync::atomic::AtomicUsize::new(0);
    let transport = |req: HttpRequest| -> Result<HttpResponse, ApiError> {
        calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        UreqTransport::new().execute(req)
    };
    let config = ClientConfig::new(&format!("http://{addr}")).unwrap();
    let dispatcher = RestDispatcher::new(config, transport);
    let api = Api::new(&dispatcher);

    let err = api
        .namespace("a")
        .child("b")
        .child("c")
        .child("d")
        .child("e")
        .child("f")
        .child("g")
        .child("h")
        .child("i")
        .child("j")
        .invoke("k", CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::NamespaceDepthExceeded { depth: 11, max: 10 }));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);

    // Nine namespaces plus the method is still within the limit.
    let err = api
        .namespace("a")
        .child("b")
        .child("c")
        .child("d")
        .child("e")
        .child("f")
        .child("g")
        .child("h")
        .child("i")
        .invoke("j", CallArgs::new())
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::CallMethodFailed { ref path, status: 404, .. } if path == "/a/b/c/d/e/f/g/h/i/j"
    ));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn reserved_characters_in_names_stay_inside_the_path() {
    let dispatcher = dispatcher(start_server());
    let api = Api::new(&dispatcher);

    let err = api
        .namespace("Misc")
        .child("Debug")
        .invoke("echo?admin=1#x", CallArgs::new().param("id", 5))
        .unwrap_err();
    assert!(matches!(
        err,
        ApiError::CallMethodFailed { status: 404, ref message, .. }
            if message == "unknown method /Misc/Debug/echo?admin=1#x"
    ));

    let err = api
        .namespace("Misc/Debug")
        .invoke("echo", CallArgs::new())
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidSegment { .. }));
}
