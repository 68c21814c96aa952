use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use fretcoach_common::config::ModelConfig;
use fretcoach_common::error::FretcoachError;
use fretcoach_common::retry::RetryPolicy;
use fretcoach_evidence::EncodedImage;
use fretcoach_model_client::{GeminiClient, GenerativeModel};

/// Serve one canned response per accepted connection, returning each
/// request's raw text.
async fn serve(responses: Vec<(u16, String)>) -> (String, tokio::task::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let reply = format!(
                "HTTP/1.1 {status} Status\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
        requests
    });

    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn config(endpoint: &str) -> ModelConfig {
    ModelConfig {
        endpoint: endpoint.to_string(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        ..ModelConfig::default()
    }
}

fn fast_retry(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
    }
}

const OK_BODY: &str = r#"{"candidates":[{"content":{"parts":[{"text":"{\"chord\":\"Am\",\"accuracy\":80}"}]}}]}"#;

#[tokio::test]
async fn generate_posts_one_request_with_all_frames() {
    let (endpoint, server) = serve(vec![(200, OK_BODY.to_string())]).await;
    let client = GeminiClient::new(&config(&endpoint), fast_retry(0)).unwrap();

    let images = vec![
        EncodedImage {
            mime_type: "image/jpeg".to_string(),
            data: "Zmlyc3Q=".to_string(),
        },
        EncodedImage {
            mime_type: "image/jpeg".to_string(),
            data: "c2Vjb25k".to_string(),
        },
    ];
    let reply = client.generate("analyze this", &images).await.unwrap();
    assert_eq!(reply, r#"{"chord":"Am","accuracy":80}"#);

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("POST /v1beta/models/gemini-1.5-flash:generateContent HTTP/1.1"));
    assert!(request
        .to_ascii_lowercase()
        .contains("x-goog-api-key: test-key"));
    assert!(!request.lines().next().unwrap().contains("test-key"));
    let first = request.find("Zmlyc3Q=").unwrap();
    let second = request.find("c2Vjb25k").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn generate_retries_server_errors() {
    let (endpoint, server) = serve(vec![
        (503, r#"{"error":"overloaded"}"#.to_string()),
        (200, OK_BODY.to_string()),
    ])
    .await;
    let client = GeminiClient::new(&config(&endpoint), fast_retry(2)).unwrap();

    let reply = client.generate("analyze this", &[]).await.unwrap();
    assert!(reply.contains("Am"));
    assert_eq!(server.await.unwrap().len(), 2);
}

#[tokio::test]
async fn generate_does_not_retry_client_errors() {
    let (endpoint, server) = serve(vec![(400, r#"{"error":"bad key"}"#.to_string())]).await;
    let client = GeminiClient::new(&config(&endpoint), fast_retry(3)).unwrap();

    let err = client.generate("analyze this", &[]).await.unwrap_err();
    match err {
        FretcoachError::Http { status, message } => {
            assert_eq!(status, Some(400));
            assert!(message.contains("bad key"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    assert_eq!(server.await.unwrap().len(), 1);
}

#[tokio::test]
async fn transport_errors_do_not_expose_the_api_key() {
    let config = ModelConfig {
        endpoint: "http://127.0.0.1:1".to_string(),
        api_key: "SENTINEL-KEY-7781".to_string(),
        timeout_secs: 5,
        ..ModelConfig::default()
    };
    let client = GeminiClient::new(&config, RetryPolicy::none()).unwrap();

    let err = client.generate("analyze this", &[]).await.unwrap_err();
    assert!(matches!(err, FretcoachError::Http { status: None, .. }));
    assert!(!err.to_string().contains("SENTINEL-KEY-7781"));
    assert!(!format!("{err:?}").contains("SENTINEL-KEY-7781"));
}
