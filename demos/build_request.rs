//! Builds a JSON request, a multipart upload and a urlencoded token request,
//! then prints what would go on the wire.
//!
//! Run with: `cargo run --example build_request`

use reqkit::{Content, Error, Request, RequestBuilder, FORM_URL_ENCODED_HEADER, JSON_CONTENT_TYPE};
use serde::Serialize;
use std::io::Cursor;

#[derive(Debug, Serialize)]
struct MessageInput {
    text: String,
}

fn print_request(label: &str, request: Request) -> Result<(), Error> {
    println!("=== {} ===", label);
    println!("{} {}", request.method(), request.url());
    for (name, values) in request.headers() {
        for value in values {
            println!("{}: {}", name, value);
        }
    }
    if let Some(body) = request.into_body() {
        let bytes = body.into_bytes()?;
        println!();
        println!("{}", String::from_utf8_lossy(&bytes));
    }
    println!();
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("reqkit=debug,build_request=info")
        .init();

    let mut message = RequestBuilder::new("POST");
    message
        .construct_http_url(
            "https://api.example.com/assistant/api",
            &["v1/workspaces", "message"],
            &["my workspace"],
        )?
        .add_header("Content-Type", JSON_CONTENT_TYPE)
        .add_query("version", "2018-09-22")
        .set_body_content_json(&MessageInput {
            text: "Hello".to_string(),
        })?;
    print_request("JSON request", message.build()?)?;

    let mut upload = RequestBuilder::new("POST");
    upload
        .construct_http_url::<&str, &str>("https://api.example.com/upload", &[], &[])?
        .add_form_data(
            "metadata",
            "meta.json",
            "application/json",
            Content::json(&serde_json::json!({"tags": ["demo"]}))?,
        )
        .add_form_data(
            "file",
            "notes.txt",
            "text/plain",
            Content::stream(Cursor::new(b"streamed file contents".to_vec())),
        )
        .add_form_data("comment", "", "", "uploaded from the demo");
    print_request("Multipart upload", upload.build()?)?;

    let mut token = RequestBuilder::new("POST");
    token
        .construct_http_url::<&str, &str>("https://iam.example.com/identity/token", &[], &[])?
        .add_header("Content-Type", FORM_URL_ENCODED_HEADER)
        .add_form_data("grant_type", "", "", "urn:example:grant-type:apikey")
        .add_form_data("apikey", "", "", "not-a-real-key");
    print_request("Urlencoded token request", token.build()?)?;

    Ok(())
}
