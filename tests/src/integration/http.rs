//! # HTTP End-to-End
//!
//! A registration file on disk is loaded by the runtime and exercised over
//! the router and a real socket.

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;
    use tower::ServiceExt;

    use appservice_runtime::{new_registration, AppserviceRuntime, RuntimeConfig};
    use as_02_registration::{AppServiceRegistration, NamespaceKind};
    use as_03_protocol_gateway::{build_router, GatewayConfig};
    use shared_bus::Channel;

    fn write_registration(dir: &tempfile::TempDir) -> (std::path::PathBuf, String) {
        let mut reg = new_registration("http://localhost:8090", "ircbot");
        reg.add_regex_pattern(NamespaceKind::Users, "@irc_.*", true)
            .unwrap();
        let path = dir.path().join("registration.yaml");
        reg.output_as_yaml(&path).unwrap();
        (path, reg.homeserver_token().unwrap().to_string())
    }

    fn local_config(path: std::path::PathBuf) -> RuntimeConfig {
        let mut config = RuntimeConfig::default();
        config.registration_path = path;
        config.gateway.host = "127.0.0.1".parse().unwrap();
        config.gateway.port = 0;
        config
    }

    async fn raw_request(addr: SocketAddr, method: &str, path: &str, body: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "{method} {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_router_over_loaded_registration() {
        let dir = tempfile::tempdir().unwrap();
        let (path, token) = write_registration(&dir);
        let runtime = AppserviceRuntime::load(&local_config(path)).unwrap();
        let router = build_router(
            runtime.gateway().clone(),
            &GatewayConfig::with_token(token.clone()),
        );

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/users/@irc_alice:x?access_token={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/_matrix/app/v1/transactions/t1")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::from(r#"{"events":[{"type":"m.room.message"}]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_live_server_delivers_to_bus() {
        let dir = tempfile::tempdir().unwrap();
        let (path, token) = write_registration(&dir);
        let mut runtime = AppserviceRuntime::load(&local_config(path)).unwrap();
        let mut stream = runtime.bus().subscribe_stream(Channel::of_type("m.room.message"));
        let addr = runtime.start().await.unwrap();

        let body = r#"{"events":[{"type":"m.room.message","body":"hi"}]}"#;
        let uri = format!("/_matrix/app/v1/transactions/t1?access_token={token}");
        let first = raw_request(addr, "PUT", &uri, body).await;
        assert!(first.starts_with("HTTP/1.1 200"), "{first}");
        let replay = raw_request(addr, "PUT", &uri, body).await;
        assert!(replay.starts_with("HTTP/1.1 200"), "{replay}");

        let event = timeout(Duration::from_secs(1), stream.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.get("body"), Some(&json!("hi")));
        assert!(matches!(stream.try_recv(), Ok(None)));

        let denied = raw_request(addr, "PUT", "/transactions/t2?access_token=nope", body).await;
        assert!(denied.starts_with("HTTP/1.1 403"), "{denied}");
        assert!(denied.contains("M_FORBIDDEN"));

        runtime.stop().await.unwrap();
    }

    #[test]
    fn test_generated_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated.yaml");
        let written =
            appservice_runtime::generate("http://bridge:9000", "bot", &path).unwrap();

        let loaded = AppServiceRegistration::load_yaml(&path).unwrap();
        assert_eq!(loaded, written);
        assert_eq!(loaded.homeserver_token().map(str::len), Some(64));
    }
}
