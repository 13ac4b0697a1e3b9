//! # reqkit - fluent assembly of HTTP requests
//!
//! reqkit builds outgoing HTTP requests for client SDKs: it joins an endpoint
//! with path segments and escaped path parameters, accumulates headers and
//! query parameters, and turns JSON values, text, streams or form fields into
//! a wire body. The finished [`Request`] is handed to an HTTP client such as
//! `reqwest`, which owns transport, TLS and retries.
//!
//! ## Quick Start
//!
//! ```
//! use reqkit::RequestBuilder;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Message {
//!     text: String,
//! }
//!
//! # fn main() -> Result<(), reqkit::Error> {
//! let mut builder = RequestBuilder::new("POST");
//! builder
//!     .construct_http_url(
//!         "https://api.example.com/assistant/api",
//!         &["v1/workspaces", "message"],
//!         &["workspace-id"],
//!     )?
//!     .add_header("Content-Type", "application/json")
//!     .add_query("version", "2018-09-22")
//!     .set_body_content_json(&Message { text: "hello".to_string() })?;
//!
//! let request = builder.build()?;
//! assert_eq!(
//!     request.url().as_str(),
//!     "https://api.example.com/assistant/api/v1/workspaces/workspace-id/message?version=2018-09-22"
//! );
//!
//! // Hand it to a transport:
//! // let response = request.send(&reqwest::blocking::Client::new())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Bodies
//!
//! Exactly one payload is active at a time; the most recent setter wins.
//!
//! - [`RequestBuilder::set_body_content_json`] - any `Serialize` value as one JSON line
//! - [`RequestBuilder::set_body_content_string`] - text, verbatim
//! - [`RequestBuilder::set_body_stream`] - any reader, pulled lazily by the transport
//! - [`RequestBuilder::set_body_content`] - three [`Content`] slots with fixed precedence
//! - [`RequestBuilder::add_form_data`] - multipart fields, or a urlencoded body when the
//!   declared content type is [`FORM_URL_ENCODED_HEADER`]
//!
//! ```
//! use reqkit::{Content, RequestBuilder, FORM_URL_ENCODED_HEADER};
//! use std::io::Cursor;
//!
//! # fn main() -> Result<(), reqkit::Error> {
//! let mut upload = RequestBuilder::new("POST");
//! upload
//!     .construct_http_url::<&str, &str>("https://api.example.com/upload", &[], &[])?
//!     .add_form_data("metadata", "meta.json", "application/json", Content::json(&[1, 2, 3])?)
//!     .add_form_data("file", "data.bin", "", Content::stream(Cursor::new(vec![0u8; 16])))
//!     .add_form_data("comment", "", "", "plain field");
//! let request = upload.build()?;
//! assert!(request.header("content-type").unwrap().starts_with("multipart/form-data"));
//!
//! let mut token = RequestBuilder::new("POST");
//! token
//!     .construct_http_url::<&str, &str>("https://iam.example.com/token", &[], &[])?
//!     .add_header("Content-Type", FORM_URL_ENCODED_HEADER)
//!     .add_form_data("grant_type", "", "", "apikey")
//!     .add_form_data("apikey", "", "", "secret");
//! let body = token.build()?.into_body().unwrap().into_bytes()?;
//! assert_eq!(body, b"grant_type=apikey&apikey=secret");
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! URL construction, body selection and builds are reported through
//! `tracing`. Install a subscriber to see them.

mod body;
mod builder;
mod content;
mod error;
pub mod multipart;
mod request;

pub use body::Body;
pub use builder::{Params, RequestBuilder, CONTENT_TYPE, FORM_URL_ENCODED_HEADER, JSON_CONTENT_TYPE};
pub use content::Content;
pub use error::{Error, Result};
pub use multipart::{FormPart, DEFAULT_FILE_CONTENT_TYPE};
pub use request::Request;
