use geoctf::catalog::load_challenges;
use geoctf::config::Config;
use geoctf::endpoints::{AppState, router};
use geoctf::ledger::SubmissionLedger;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn spawn_server() -> std::net::SocketAddr {
    let catalog = Arc::new(load_challenges());
    let ledger = Arc::new(SubmissionLedger::in_memory(catalog.clone()));
    let config = Config::default();
    let app = router(Arc::new(AppState::new(catalog, ledger, &config)), &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Minimal HTTP/1.1 exchange; returns the status line and the raw response.
async fn request(addr: std::net::SocketAddr, method: &str, path: &str, body: Option<&str>) -> (u16, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = body {
        req.push_str(&format!(
            "Content-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        ));
    } else {
        req.push_str("\r\n");
    }
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    let status = raw
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap();
    (status, raw)
}

#[tokio::test]
async fn test_health_and_challenges() {
    let addr = spawn_server().await;
    let (status, raw) = request(addr, "GET", "/health", None).await;
    assert_eq!(status, 200);
    assert!(raw.ends_with(r#"{"status":"ok"}"#));

    let (status, raw) = request(addr, "GET", "/api/v1/challenges", None).await;
    assert_eq!(status, 200);
    assert!(raw.contains("geofence-escape"));
    assert!(!raw.contains("CTF{"));

    let (status, raw) = request(addr, "GET", "/api/v1/challenges/nope", None).await;
    assert_eq!(status, 404);
    assert!(raw.contains("Challenge not found"));
}

#[tokio::test]
async fn test_submit_and_scoreboard() {
    let addr = spawn_server().await;
    let body = r#"{"challengeId":"map-tile-hijacking","flag":"CTF{m4p_t1l3_h1j4ck3d}","player":"zoe"}"#;
    let (status, raw) = request(addr, "POST", "/api/v1/submissions", Some(body)).await;
    assert_eq!(status, 200);
    assert!(raw.contains(r#""points":150"#));

    let wrong = r#"{"challengeId":"map-tile-hijacking","flag":"nope","player":"zoe"}"#;
    let (status, _) = request(addr, "POST", "/api/v1/submissions", Some(wrong)).await;
    assert_eq!(status, 400);

    let (status, raw) = request(addr, "GET", "/api/v1/scoreboard", None).await;
    assert_eq!(status, 200);
    assert!(raw.contains(r#""player":"zoe""#));
}

#[tokio::test]
async fn test_index_sets_session_and_navigation_redirects() {
    let addr = spawn_server().await;
    let (status, raw) = request(addr, "GET", "/", None).await;
    assert_eq!(status, 200);
    assert!(raw.to_ascii_lowercase().contains("set-cookie: geoctf_session="));
    assert!(raw.contains("GPS Spoofing"));

    let (status, raw) = request(addr, "POST", "/next", None).await;
    assert_eq!(status, 303);
    assert!(raw.to_ascii_lowercase().contains("location: /"));
}
