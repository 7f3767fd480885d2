//! Integration tests for the Gemini client against a loopback HTTP server.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use elemental::{
    CompletionClient, CompletionLogger, FailureReason, Gemini, GenerateContentRequest,
};

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
struct Recorded {
    request_line: String,
    headers: Vec<(String, String)>,
    body: Value,
}

impl Recorded {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serves the same canned response to every connection and records requests.
async fn serve(status: u16, body: &'static str) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = recorded.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let sink = sink.clone();
            tokio::spawn(async move {
                handle(stream, status, body, sink).await;
            });
        }
    });
    (format!("http://{addr}/v1beta"), recorded)
}

async fn handle(
    mut stream: TcpStream,
    status: u16,
    body: &'static str,
    sink: Arc<Mutex<Vec<Recorded>>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };
    let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    let content_length: usize = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.parse().unwrap())
        .unwrap_or(0);
    let mut request_body = buf[head_end + 4..].to_vec();
    while request_body.len() < content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        request_body.extend_from_slice(&chunk[..n]);
    }
    sink.lock().unwrap().push(Recorded {
        request_line,
        headers,
        body: serde_json::from_slice(&request_body).unwrap_or(Value::Null),
    });

    let reason = if status < 400 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    let _ = stream.shutdown().await;
}

fn client(base_url: String) -> Gemini {
    Gemini::with_options(Some("test-key".to_string()), Some(base_url), None).unwrap()
}

const REPLY: &str = r#"{
  "candidates": [
    {
      "content": {"role": "model", "parts": [{"text": "hi "}, {"text": "there"}]},
      "finishReason": "STOP"
    }
  ],
  "modelVersion": "gemini-2.5-flash"
}"#;

#[tokio::test]
async fn sends_single_turn_request() {
    let (base_url, recorded) = serve(200, REPLY).await;
    let client = client(base_url);

    assert_eq!(client.complete("hello").await, Ok("hi there".to_string()));

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 1);
    let request = &recorded[0];
    assert_eq!(
        request.request_line,
        "POST /v1beta/models/gemini-2.5-flash:generateContent HTTP/1.1"
    );
    assert_eq!(request.header("x-goog-api-key"), Some("test-key"));
    assert_eq!(
        request.body,
        json!({
            "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
            "generationConfig": {"thinkingConfig": {"thinkingBudget": 0}}
        })
    );
}

#[tokio::test]
async fn each_call_sends_only_its_own_prompt() {
    let (base_url, recorded) = serve(200, REPLY).await;
    let client = client(base_url);

    client.complete("first").await.unwrap();
    client.complete("second").await.unwrap();

    let recorded = recorded.lock().unwrap();
    assert_eq!(recorded.len(), 2);
    assert_eq!(recorded[1].body["contents"].as_array().unwrap().len(), 1);
    assert_eq!(recorded[1].body["contents"][0]["parts"][0]["text"], "second");
}

#[tokio::test]
async fn custom_model_is_in_the_path() {
    let (base_url, recorded) = serve(200, REPLY).await;
    let client = Gemini::with_options(
        Some("test-key".to_string()),
        Some(format!("{base_url}/")),
        Some("gemini-2.5-pro".to_string()),
    )
    .unwrap();

    client.complete("hello").await.unwrap();
    assert_eq!(
        recorded.lock().unwrap()[0].request_line,
        "POST /v1beta/models/gemini-2.5-pro:generateContent HTTP/1.1"
    );
}

#[tokio::test]
async fn invalid_key_is_a_configuration_failure() {
    let (base_url, recorded) = serve(
        400,
        r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"@type":"type.googleapis.com/google.rpc.ErrorInfo","reason":"API_KEY_INVALID"}]}}"#,
    )
    .await;
    let client = client(base_url);

    assert_eq!(
        client.complete("hello").await,
        Err(FailureReason::Configuration)
    );
    assert_eq!(recorded.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn service_error_carries_message() {
    let (base_url, _) = serve(
        503,
        r#"{"error":{"code":503,"message":"The model is overloaded","status":"UNAVAILABLE"}}"#,
    )
    .await;
    let client = client(base_url);

    let failure = client.complete("hello").await.unwrap_err();
    assert_eq!(
        failure,
        FailureReason::Service {
            message: "The model is overloaded".to_string()
        }
    );
    assert_eq!(
        failure.to_string(),
        "An error occurred: The model is overloaded. Please try again."
    );
}

#[tokio::test]
async fn empty_error_body_is_unknown() {
    let (base_url, _) = serve(500, "").await;
    let client = client(base_url);
    assert_eq!(client.complete("hello").await, Err(FailureReason::Unknown));
}

#[tokio::test]
async fn success_without_text_is_malformed() {
    let (base_url, _) = serve(200, r#"{"candidates":[]}"#).await;
    let client = client(base_url);
    assert_eq!(
        client.complete("hello").await,
        Err(FailureReason::MalformedResponse)
    );
}

#[tokio::test]
async fn refused_connection_is_a_service_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client(format!("http://{addr}/v1beta"));

    assert!(matches!(
        client.complete("hello").await,
        Err(FailureReason::Service { .. })
    ));
}

#[derive(Default)]
struct RecordingLogger {
    events: Mutex<Vec<String>>,
}

impl CompletionLogger for RecordingLogger {
    fn log_request(&self, model: &str, request: &GenerateContentRequest) {
        let body = serde_json::to_string(request).unwrap();
        self.events
            .lock()
            .unwrap()
            .push(format!("request {model} {body}"));
    }

    fn log_completion(&self, model: &str, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(format!("completion {model} {text}"));
    }

    fn log_failure(&self, model: &str, reason: &FailureReason) {
        self.events
            .lock()
            .unwrap()
            .push(format!("failure {model} {}", reason.kind()));
    }
}

#[tokio::test]
async fn logger_sees_request_and_outcome() {
    let (base_url, _) = serve(200, REPLY).await;
    let logger = Arc::new(RecordingLogger::default());
    let client = client(base_url).with_logger(logger.clone());

    client.complete("hello").await.unwrap();

    let events = logger.events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].starts_with("request gemini-2.5-flash "));
    assert!(events[0].contains("\"thinkingBudget\":0"));
    assert_eq!(events[1], "completion gemini-2.5-flash hi there");
}
