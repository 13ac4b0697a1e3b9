//! Integration tests that send built requests to a wiremock server.

use reqkit::{Content, Error, Request, RequestBuilder, FORM_URL_ENCODED_HEADER, JSON_CONTENT_TYPE};
use serde::Serialize;
use std::fs::File;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEST_FILE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/test_file.txt");

#[derive(Debug, Serialize)]
struct TestStructure {
    name: String,
}

/// A decoded multipart part.
#[derive(Debug)]
struct DecodedPart {
    disposition: String,
    content_type: Option<String>,
    value: String,
}

/// Sends on a blocking thread; the blocking client must not live inside the runtime.
async fn send(request: Request) -> (u16, String) {
    tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();
        let response = request.send(&client).unwrap();
        let status = response.status().as_u16();
        (status, response.text().unwrap())
    })
    .await
    .unwrap()
}

fn decode_multipart(content_type: &str, body: &[u8]) -> Vec<DecodedPart> {
    let boundary = content_type
        .split("boundary=")
        .nth(1)
        .expect("content type carries a boundary");
    let text = String::from_utf8(body.to_vec()).unwrap();
    let delimiter = format!("--{}", boundary);

    let mut chunks: Vec<&str> = text.split(delimiter.as_str()).collect();
    assert_eq!(chunks.remove(0), "");
    assert_eq!(chunks.pop(), Some("--\r\n"));

    chunks
        .into_iter()
        .map(|chunk| {
            let chunk = chunk
                .strip_prefix("\r\n")
                .and_then(|c| c.strip_suffix("\r\n"))
                .expect("part is framed by CRLF");
            let (head, value) = chunk.split_once("\r\n\r\n").expect("part has a header block");
            let mut lines = head.split("\r\n");
            let disposition = lines.next().unwrap().to_string();
            let content_type = lines
                .next()
                .map(|line| line.trim_start_matches("Content-Type: ").to_string());
            DecodedPart {
                disposition,
                content_type,
                value: value.to_string(),
            }
        })
        .collect()
}

fn form_request(uri: &str) -> RequestBuilder {
    let mut builder = RequestBuilder::new("POST");
    builder
        .construct_http_url::<&str, &str>(uri, &["upload"], &[])
        .unwrap();
    builder
}

#[tokio::test]
async fn test_json_request_reaches_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/assistant/api/v1/workspaces/xxxxx/message"))
        .and(query_param("Version", "2018-22-09"))
        .and(header("content-type", JSON_CONTENT_TYPE))
        .and(body_string("{\"name\":\"wonder woman\"}\n"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let endpoint = format!("{}/assistant/api", mock_server.uri());
    let mut builder = RequestBuilder::new("POST");
    builder
        .construct_http_url(&endpoint, &["v1/workspaces", "message"], &["xxxxx"])
        .unwrap()
        .add_header("Content-Type", JSON_CONTENT_TYPE)
        .add_query("Version", "2018-22-09")
        .set_body_content_json(&TestStructure {
            name: "wonder woman".to_string(),
        })
        .unwrap();

    let (status, body) = send(builder.build().unwrap()).await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_path_parameters_are_escaped_on_the_wire() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/files/a%20b%2Fc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut builder = RequestBuilder::new("GET");
    builder
        .construct_http_url(&mock_server.uri(), &["files"], &["a b/c"])
        .unwrap();

    let (status, _) = send(builder.build().unwrap()).await;
    assert_eq!(status, 204);
}

#[tokio::test]
async fn test_file_stream_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/upload"))
        .and(header("content-type", "text/plain"))
        .and(body_string("hello world from text file"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut builder = RequestBuilder::new("PUT");
    builder
        .construct_http_url::<&str, &str>(&mock_server.uri(), &["upload"], &[])
        .unwrap()
        .set_body_content(
            "text/plain",
            None,
            None,
            Some(Content::stream(File::open(TEST_FILE).unwrap())),
        )
        .unwrap();

    let request = builder.build().unwrap();
    assert!(request.body().unwrap().is_stream());

    let (status, _) = send(request).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_multipart_form_parts_arrive_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut builder = form_request(&mock_server.uri());
    builder
        .add_header("Content-Type", "Application/json")
        .add_form_data(
            "name1",
            "json1.json",
            "application/json",
            Content::json(&TestStructure {
                name: "test name1".to_string(),
            })
            .unwrap(),
        )
        .add_form_data("hello", "", "text/plain", "Hello SDK")
        .add_form_data(
            "test_file",
            "test_file.txt",
            "",
            Content::stream(File::open(TEST_FILE).unwrap()),
        );

    let (status, _) = send(builder.build().unwrap()).await;
    assert_eq!(status, 200);

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let content_type = received[0]
        .headers
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let parts = decode_multipart(&content_type, &received[0].body);
    assert_eq!(parts.len(), 3);

    assert_eq!(
        parts[0].disposition,
        "Content-Disposition: form-data; name=\"name1\"; filename=\"json1.json\""
    );
    assert_eq!(parts[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(parts[0].value, "{\"name\":\"test name1\"}");

    assert_eq!(parts[1].disposition, "Content-Disposition: form-data; name=\"hello\"");
    assert_eq!(parts[1].content_type.as_deref(), Some("text/plain"));
    assert_eq!(parts[1].value, "Hello SDK");

    assert_eq!(
        parts[2].disposition,
        "Content-Disposition: form-data; name=\"test_file\"; filename=\"test_file.txt\""
    );
    assert_eq!(
        parts[2].content_type.as_deref(),
        Some("application/octet-stream")
    );
    assert_eq!(parts[2].value, "hello world from text file");
}

#[tokio::test]
async fn test_urlencoded_form_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload"))
        .and(query_param("Version", "2018-22-09"))
        .and(header("content-type", FORM_URL_ENCODED_HEADER))
        .and(body_string("grant_type=lalalala&apikey=xxxx"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut builder = form_request(&mock_server.uri());
    builder
        .add_header("Content-Type", FORM_URL_ENCODED_HEADER)
        .add_query("Version", "2018-22-09")
        .add_form_data("grant_type", "", "", "lalalala")
        .add_form_data("apikey", "", "", "xxxx");

    let (status, _) = send(builder.build().unwrap()).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_transport_failure_is_network_error() {
    let mut builder = RequestBuilder::new("GET");
    builder
        .construct_http_url::<&str, &str>("http://127.0.0.1:1", &["unreachable"], &[])
        .unwrap();
    let request = builder.build().unwrap();

    let result = tokio::task::spawn_blocking(move || {
        let client = reqwest::blocking::Client::new();
        request.send(&client).map(|_| ())
    })
    .await
    .unwrap();

    match result {
        Err(e @ Error::Network(_)) => assert!(!e.is_client_side()),
        other => panic!("Expected Network error, got {:?}", other),
    }
}

/// Counts how many times the transport pulled from the source.
struct CountingReader {
    inner: io::Cursor<Vec<u8>>,
    reads: Arc<AtomicUsize>,
}

impl Read for CountingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(buf)
    }
}

#[test]
fn test_build_does_not_read_streams() {
    let reads = Arc::new(AtomicUsize::new(0));
    let make_reader = || CountingReader {
        inner: io::Cursor::new(b"large payload".to_vec()),
        reads: reads.clone(),
    };

    let mut body_builder = RequestBuilder::new("POST");
    body_builder
        .construct_http_url::<&str, &str>("https://example.com", &[], &[])
        .unwrap()
        .set_body_stream(make_reader());
    let body_request = body_builder.build().unwrap();

    let mut form_builder = form_request("https://example.com");
    form_builder.add_form_data("file", "big.bin", "", Content::stream(make_reader()));
    let form_built = form_builder.build().unwrap();

    assert_eq!(reads.load(Ordering::SeqCst), 0);

    let bytes = body_request.into_body().unwrap().into_bytes().unwrap();
    assert_eq!(bytes, b"large payload");
    let form = form_built.into_body().unwrap().into_bytes().unwrap();
    assert!(String::from_utf8(form).unwrap().contains("large payload"));
    assert!(reads.load(Ordering::SeqCst) > 0);
}

#[test]
fn test_invalid_endpoint_is_reported() {
    let mut builder = RequestBuilder::new("GET");
    let err = builder
        .construct_http_url::<&str, &str>("test.com", &[], &[])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
    assert!(err.is_client_side());
    assert!(builder.url().is_none());
}
