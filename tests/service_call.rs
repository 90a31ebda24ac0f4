//! Interface service calls against a mock backend.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use pathway::config::{AppConfig, RouteConfig, ServicesConfig};
use pathway::controller::{ControllerRegistry, ServiceClient, ServiceError};
use pathway::HttpServer;
use serde_json::{json, Value};

mod common;

fn services(backend: SocketAddr) -> ServicesConfig {
    ServicesConfig {
        interface_host: format!("http://{}/", backend),
        ..ServicesConfig::default()
    }
}

/// Pull the `data` form field out of an urlencoded body.
fn form_data(body: &str) -> Value {
    let encoded = body
        .split('&')
        .find_map(|pair| pair.strip_prefix("data="))
        .unwrap();
    let decoded = urlencoding::decode(&encoded.replace('+', " ")).unwrap().into_owned();
    serde_json::from_str(&decoded).unwrap()
}

#[tokio::test]
async fn test_call_posts_form_encoded_details() {
    let backend: SocketAddr = "127.0.0.1:28401".parse().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    common::start_programmable_backend(backend, move |req| {
        log.lock().unwrap().push(req);
        async { (200, r#"{"ok":true,"total":3}"#.to_string()) }
    })
    .await;

    let client = ServiceClient::new(&services(backend)).unwrap();
    let reply = client
        .call("Billing", "Invoice", &json!({"order": 7, "note": "a b&c"}))
        .await
        .unwrap();
    assert_eq!(reply, json!({"ok": true, "total": 3}));

    let requests = seen.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/API/Billing/Invoice");
    assert_eq!(
        requests[0].header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(form_data(&requests[0].body), json!({"order": 7, "note": "a b&c"}));
}

#[tokio::test]
async fn test_call_defaults_and_errors() {
    let backend: SocketAddr = "127.0.0.1:28402".parse().unwrap();
    common::start_programmable_backend(backend, |req| async move {
        match req.path.as_str() {
            "/API/Default/Index" => (200, "[]".to_string()),
            "/API/Broken/Index" => (500, "boom".to_string()),
            _ => (200, "not json".to_string()),
        }
    })
    .await;
    let client = ServiceClient::new(&services(backend)).unwrap();

    assert_eq!(client.call("", "", &json!({})).await.unwrap(), json!([]));
    assert!(matches!(
        client.call("Broken", "", &json!({})).await,
        Err(ServiceError::Status { status: 500, ref body }) if body == "boom"
    ));
    assert!(matches!(
        client.call("Other", "Thing", &json!({})).await,
        Err(ServiceError::Decode(_))
    ));
}

#[tokio::test]
async fn test_call_unreachable_host() {
    let client = ServiceClient::new(&services("127.0.0.1:28403".parse().unwrap())).unwrap();
    assert!(matches!(
        client.call("Any", "Thing", &json!({})).await,
        Err(ServiceError::Transport(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_forward_route_reaches_service() {
    let backend: SocketAddr = "127.0.0.1:28404".parse().unwrap();
    common::start_programmable_backend(backend, |req| async move {
        let details = form_data(&req.body);
        let reply = json!({"path": req.path, "details": details});
        (200, reply.to_string())
    })
    .await;

    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:28405".into();
    config.services = services(backend);
    config.routes.push(RouteConfig {
        uri: Some("/api/{service}/{action}/{id:integer}".into()),
        action: "forward@services".into(),
        ..RouteConfig::default()
    });
    let controllers = ControllerRegistry::with_builtins(&config.services).unwrap();
    let running = common::spawn_server(HttpServer::new(config, Arc::new(controllers)).unwrap()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/api/Users/Show/9", running.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["path"], "/API/Users/Show");
    assert_eq!(body["details"]["id"], 9);

    let res = client
        .post(format!("http://{}/api/Users/Update/9", running.addr))
        .json(&json!({"name": "ana"}))
        .send()
        .await
        .unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["details"], json!({"name": "ana"}));

    running.shutdown.trigger();
}
