//! The request builder.
//!
//! [`RequestBuilder`] accumulates a URL, headers, query parameters and one
//! payload, then produces a [`Request`] with [`RequestBuilder::build`].

use crate::{
    multipart::{self, FormPart},
    Body, Content, Error, Request, Result,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Read;
use url::Url;

/// Name of the content type header.
pub const CONTENT_TYPE: &str = "Content-Type";

/// Content type that switches simple form fields to a urlencoded body.
pub const FORM_URL_ENCODED_HEADER: &str = "application/x-www-form-urlencoded";

/// Content type for JSON bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// A path parameter must stay a single segment.
const PATH_PARAMETER_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Ordered multi-value mapping used for headers and query parameters.
pub type Params = BTreeMap<String, Vec<String>>;

/// Builder for assembling a single outgoing request.
///
/// # Examples
///
/// ```
/// use reqkit::RequestBuilder;
/// use serde_json::json;
///
/// # fn main() -> Result<(), reqkit::Error> {
/// let mut builder = RequestBuilder::new("POST");
/// builder
///     .construct_http_url(
///         "https://api.example.com/assistant/api",
///         &["v1/workspaces", "message"],
///         &["my workspace"],
///     )?
///     .add_header("Content-Type", "application/json")
///     .add_query("version", "2018-09-22")
///     .set_body_content_json(&json!({"name": "wonder woman"}))?;
///
/// let request = builder.build()?;
/// assert_eq!(
///     request.url().as_str(),
///     "https://api.example.com/assistant/api/v1/workspaces/my%20workspace/message?version=2018-09-22"
/// );
/// assert_eq!(request.into_body().unwrap().into_bytes()?, b"{\"name\":\"wonder woman\"}\n");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RequestBuilder {
    method: String,
    url: Option<Url>,
    headers: Params,
    query: Params,
    body: Option<Body>,
    form_data: Vec<FormPart>,
}

impl RequestBuilder {
    /// Creates a builder for the given HTTP method.
    ///
    /// The method is not validated here; an invalid one is rejected when the
    /// built request is converted for a transport.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: None,
            headers: Params::new(),
            query: Params::new(),
            body: None,
            form_data: Vec::new(),
        }
    }

    /// Sets the URL from an endpoint plus path segments and path parameters.
    ///
    /// Segments and parameters are interleaved: segment 0, parameter 0,
    /// segment 1, parameter 1, and so on. Parameters beyond the number of
    /// segments are ignored. Segments are literal and may contain `/`;
    /// parameters are percent-escaped into a single segment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `endpoint` is not an absolute URL.
    /// The previously constructed URL, if any, is kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqkit::RequestBuilder;
    ///
    /// let mut builder = RequestBuilder::new("GET");
    /// builder
    ///     .construct_http_url("https://example.com/api/", &["v1/items"], &["a/b"])
    ///     .unwrap();
    /// assert_eq!(builder.url().unwrap().as_str(), "https://example.com/api/v1/items/a%2Fb");
    /// ```
    pub fn construct_http_url<S, P>(
        &mut self,
        endpoint: &str,
        path_segments: &[S],
        path_parameters: &[P],
    ) -> Result<&mut Self>
    where
        S: AsRef<str>,
        P: AsRef<str>,
    {
        let mut url = Url::parse(endpoint)?;
        if url.cannot_be_a_base() {
            return Err(Error::ConfigurationError(format!(
                "Endpoint cannot carry a path: {}",
                endpoint
            )));
        }

        let mut path = url.path().trim_end_matches('/').to_owned();
        for (i, segment) in path_segments.iter().enumerate() {
            push_piece(&mut path, segment.as_ref());
            if let Some(parameter) = path_parameters.get(i) {
                let escaped =
                    utf8_percent_encode(parameter.as_ref(), PATH_PARAMETER_ENCODE_SET).to_string();
                push_piece(&mut path, &escaped);
            }
        }
        url.set_path(&path);

        tracing::debug!(url = %url, "Constructed request URL");

        self.url = Some(url);
        Ok(self)
    }

    /// Appends a header value.
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Appends a query parameter value.
    pub fn add_query(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.query.entry(name.into()).or_default().push(value.into());
        self
    }

    /// Serializes `value` as JSON, followed by a newline, and uses it as the body.
    ///
    /// `Content-Type` is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `value` cannot be encoded.
    /// The current body is left unchanged.
    pub fn set_body_content_json<T>(&mut self, value: &T) -> Result<&mut Self>
    where
        T: Serialize + ?Sized,
    {
        let bytes = match json_line(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected JSON body");
                return Err(e);
            }
        };
        Ok(self.install_body(Body::from_bytes(bytes)))
    }

    /// Uses `value` verbatim as the body.
    pub fn set_body_content_string(&mut self, value: impl Into<String>) -> &mut Self {
        let value: String = value.into();
        self.install_body(Body::from(value))
    }

    /// Uses `reader` as the body. It is read lazily by the transport.
    pub fn set_body_stream<R>(&mut self, reader: R) -> &mut Self
    where
        R: Read + Send + 'static,
    {
        self.install_body(Body::from_reader(reader))
    }

    /// Uses a single [`Content`] value as the body.
    ///
    /// Text and streams are used verbatim; structured values are
    /// JSON-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if a structured value cannot be
    /// encoded.
    pub fn set_body(&mut self, content: Content) -> Result<&mut Self> {
        let body = verbatim_body(content)?;
        Ok(self.install_body(body))
    }

    /// Sets the body from whichever of three slots is filled.
    ///
    /// Precedence is `json_content`, then `non_json_content`, then
    /// `file_content`; only one slot is used.
    ///
    /// * `json_content` is always JSON-encoded. Streams are rejected.
    /// * `non_json_content` uses text and streams verbatim and JSON-encodes
    ///   structured values.
    /// * `file_content` accepts text and streams only.
    ///
    /// A non-empty `content_type` becomes the `Content-Type` header unless
    /// one was already added.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedContentType`] when the chosen slot does not
    /// accept the content's kind, and [`Error::SerializationFailed`] when
    /// JSON encoding fails. The current body is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use reqkit::{Content, RequestBuilder};
    ///
    /// let mut builder = RequestBuilder::new("POST");
    /// let err = builder
    ///     .set_body_content("", None, None, Some(Content::json(&200).unwrap()))
    ///     .unwrap_err();
    /// assert_eq!(err.to_string(), "Invalid type for non-JSON body content: number");
    ///
    /// builder
    ///     .set_body_content("text/plain", None, None, Some(Content::text("hello SDK")))
    ///     .unwrap();
    /// assert_eq!(builder.header("content-type"), Some("text/plain"));
    /// ```
    pub fn set_body_content(
        &mut self,
        content_type: &str,
        json_content: Option<Content>,
        non_json_content: Option<Content>,
        file_content: Option<Content>,
    ) -> Result<&mut Self> {
        let resolved = if let Some(content) = json_content {
            tracing::trace!(kind = content.kind(), "Using JSON body slot");
            json_body(content)
        } else if let Some(content) = non_json_content {
            tracing::trace!(kind = content.kind(), "Using non-JSON body slot");
            verbatim_body(content)
        } else if let Some(content) = file_content {
            tracing::trace!(kind = content.kind(), "Using file body slot");
            file_body(content)
        } else {
            return Ok(self);
        };

        let body = match resolved {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, "Rejected body content");
                return Err(e);
            }
        };

        if !content_type.is_empty() && self.header(CONTENT_TYPE).is_none() {
            self.add_header(CONTENT_TYPE, content_type);
        }
        Ok(self.install_body(body))
    }

    /// Appends a form field.
    ///
    /// An empty `file_name` makes a simple field; otherwise the field is a
    /// file part whose content type defaults to `application/octet-stream`.
    /// Encoding happens in [`build`](Self::build).
    pub fn add_form_data(
        &mut self,
        field_name: impl Into<String>,
        file_name: &str,
        content_type: &str,
        content: impl Into<Content>,
    ) -> &mut Self {
        self.body = None;
        self.form_data
            .push(FormPart::new(field_name, file_name, content_type, content.into()));
        self
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Returns the URL, once constructed.
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Returns all accumulated headers.
    pub fn headers(&self) -> &Params {
        &self.headers
    }

    /// Returns the first value of a header, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, name)
    }

    /// Returns all accumulated query parameters.
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// Returns the current body, if one is set.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Removes and returns the current body.
    pub fn take_body(&mut self) -> Option<Body> {
        self.body.take()
    }

    /// Returns the accumulated form fields.
    pub fn form_data(&self) -> &[FormPart] {
        &self.form_data
    }

    /// Consumes the builder and produces the request.
    ///
    /// Form fields become a urlencoded body when the declared content type is
    /// `application/x-www-form-urlencoded` and every field is simple text;
    /// otherwise they become a multipart body, replacing any declared
    /// `Content-Type`. Without form fields the body set earlier is used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if no URL was constructed or a
    /// form field's content type is not a valid MIME type, and
    /// [`Error::SerializationFailed`] if a form field cannot be encoded.
    pub fn build(self) -> Result<Request> {
        let RequestBuilder {
            method,
            url,
            mut headers,
            query,
            body,
            form_data,
        } = self;

        let mut url =
            url.ok_or_else(|| Error::ConfigurationError("Request URL is required".to_string()))?;

        let body = if form_data.is_empty() {
            body
        } else {
            Some(form_body(&mut headers, form_data)?)
        };

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, values) in &query {
                for value in values {
                    pairs.append_pair(name, value);
                }
            }
        }

        tracing::debug!(
            method = %method,
            url = %url,
            body = body_kind(body.as_ref()),
            "Built request"
        );

        Ok(Request::new(method, url, headers, body))
    }

    fn install_body(&mut self, body: Body) -> &mut Self {
        self.form_data.clear();
        self.body = Some(body);
        self
    }
}

fn push_piece(path: &mut String, piece: &str) {
    let piece = piece.trim_matches('/');
    if piece.is_empty() {
        return;
    }
    path.push('/');
    path.push_str(piece);
}

pub(crate) fn first_value<'a>(params: &'a Params, name: &str) -> Option<&'a str> {
    params
        .iter()
        .filter(|(key, _)| key.eq_ignore_ascii_case(name))
        .find_map(|(_, values)| values.first())
        .map(String::as_str)
}

fn json_line<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut bytes = serde_json::to_vec(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn json_body(content: Content) -> Result<Body> {
    match content {
        Content::Json(value) => Ok(Body::from_bytes(json_line(&value)?)),
        Content::Text(text) => Ok(Body::from_bytes(json_line(&text)?)),
        Content::Stream(_) => Err(Error::UnsupportedContentType {
            slot: "JSON",
            kind: "stream",
        }),
    }
}

fn verbatim_body(content: Content) -> Result<Body> {
    match content {
        Content::Text(text) => Ok(Body::from(text)),
        Content::Stream(reader) => Ok(Body::from_boxed_reader(reader)),
        Content::Json(value) => Ok(Body::from_bytes(json_line(&value)?)),
    }
}

fn file_body(content: Content) -> Result<Body> {
    match content {
        Content::Text(text) => Ok(Body::from(text)),
        Content::Json(serde_json::Value::String(text)) => Ok(Body::from(text)),
        Content::Stream(reader) => Ok(Body::from_boxed_reader(reader)),
        other => Err(Error::UnsupportedContentType {
            slot: "non-JSON",
            kind: other.kind(),
        }),
    }
}

fn is_form_urlencoded(headers: &Params) -> bool {
    first_value(headers, CONTENT_TYPE)
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(FORM_URL_ENCODED_HEADER))
}

fn form_body(headers: &mut Params, form_data: Vec<FormPart>) -> Result<Body> {
    if is_form_urlencoded(headers) {
        if let Some(encoded) = multipart::encode_urlencoded(&form_data) {
            tracing::trace!(fields = form_data.len(), "Encoding form as urlencoded");
            return Ok(Body::from(encoded));
        }
    }

    tracing::trace!(fields = form_data.len(), "Encoding form as multipart");
    let form = multipart::into_form(form_data)?;
    headers.retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
    headers.insert(CONTENT_TYPE.to_string(), vec![multipart::content_type(&form)]);
    Ok(multipart::into_body(form))
}

fn body_kind(body: Option<&Body>) -> &'static str {
    match body {
        None => "none",
        Some(body) if body.is_stream() => "stream",
        Some(_) => "bytes",
    }
}
