//! End-to-end tests driving the service over real HTTP.

use std::net::SocketAddr;
use std::time::Duration;

use portico::prelude::{Server, ServerConfig, ServerError, ShutdownSignal};
use tokio::task::JoinHandle;

struct TestServer {
    addr: SocketAddr,
    shutdown: ShutdownSignal,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    async fn start() -> Self {
        let config = ServerConfig::builder()
            .bind_addr("127.0.0.1:0")
            .drain_timeout(Duration::from_secs(5))
            .build();

        let server = Server::new(
            config,
            hello_api::contract().unwrap(),
            hello_api::handlers::registry().unwrap(),
        );
        let bound = server.bind().await.unwrap();
        let addr = bound.local_addr();

        let shutdown = ShutdownSignal::new();
        let handle = {
            let shutdown = shutdown.clone();
            tokio::spawn(bound.serve(shutdown))
        };

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(response.text().await.unwrap(), "OK");

    server.stop().await;
}

#[tokio::test]
async fn hello_greets_the_user() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/hello/world")).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Hello world!");

    let response = reqwest::get(server.url("/hello/42")).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "Hello 42!");

    server.stop().await;
}

#[tokio::test]
async fn hello_without_a_user_is_a_client_error() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/hello/")).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "PARAM_TYPE_MISMATCH");

    server.stop().await;
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = TestServer::start().await;

    let response = reqwest::get(server.url("/missing")).await.unwrap();
    assert_eq!(response.status(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    // A trailing slash on a literal route is a different path.
    let response = reqwest::get(server.url("/health/")).await.unwrap();
    assert_eq!(response.status(), 404);

    server.stop().await;
}

#[tokio::test]
async fn wrong_method_is_rejected_with_allow() {
    let server = TestServer::start().await;

    let client = reqwest::Client::new();
    let response = client.post(server.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 405);
    assert_eq!(response.headers().get("allow").unwrap(), "GET");

    server.stop().await;
}

#[tokio::test]
async fn shutdown_stops_accepting() {
    let server = TestServer::start().await;
    let url = server.url("/health");

    // Served before shutdown.
    assert_eq!(reqwest::get(&url).await.unwrap().status(), 200);

    let addr = server.addr;
    server.stop().await;

    // Refused after drain.
    assert!(tokio::net::TcpStream::connect(addr).await.is_err());
}
