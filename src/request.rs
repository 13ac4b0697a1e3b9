//! The finished request produced by [`RequestBuilder::build`](crate::RequestBuilder::build).
//!
//! A [`Request`] carries the method, the final URL with its query string,
//! the headers and the body. It can be handed to a transport either as an
//! `http::Request` or as a `reqwest::blocking::Request`.

use crate::{builder::first_value, builder::Params, Body, Error, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

/// An assembled HTTP request.
///
/// # Examples
///
/// ```
/// use reqkit::RequestBuilder;
///
/// # fn main() -> Result<(), reqkit::Error> {
/// let mut builder = RequestBuilder::new("GET");
/// builder
///     .construct_http_url("https://api.example.com", &["users"], &["42"])?
///     .add_header("Accept", "application/json");
///
/// let request = builder.build()?;
/// assert_eq!(request.method(), "GET");
/// assert_eq!(request.url().as_str(), "https://api.example.com/users/42");
/// assert_eq!(request.header("accept"), Some("application/json"));
///
/// let http_request = request.into_http()?;
/// assert_eq!(http_request.method(), http::Method::GET);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Request {
    method: String,
    url: Url,
    headers: Params,
    body: Option<Body>,
}

impl Request {
    pub(crate) fn new(method: String, url: Url, headers: Params, body: Option<Body>) -> Self {
        Self {
            method,
            url,
            headers,
            body,
        }
    }

    /// The HTTP method, as given to the builder.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The final URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// All headers, each with its values in insertion order.
    pub fn headers(&self) -> &Params {
        &self.headers
    }

    /// Returns the first value of a header, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        first_value(&self.headers, name)
    }

    /// The body, if the request has one.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Consumes the request and returns its body.
    pub fn into_body(self) -> Option<Body> {
        self.body
    }

    /// Converts into an `http::Request`.
    ///
    /// A request without a body gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the method, a header name or
    /// a header value is invalid.
    pub fn into_http(self) -> Result<http::Request<Body>> {
        let method = parse_method(&self.method)?;
        let headers = header_map(&self.headers)?;

        let body = self.body.unwrap_or_else(|| Body::from_bytes(Vec::new()));
        let mut request = http::Request::new(body);
        *request.method_mut() = method;
        *request.uri_mut() = self
            .url
            .as_str()
            .parse()
            .map_err(|e| Error::ConfigurationError(format!("Invalid request URI: {}", e)))?;
        *request.headers_mut() = headers;
        Ok(request)
    }

    /// Converts into a `reqwest::blocking::Request`.
    ///
    /// Stream bodies are handed over unread, so the transport pulls them
    /// as it sends.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationError`] if the method, a header name or
    /// a header value is invalid.
    pub fn into_reqwest(self) -> Result<reqwest::blocking::Request> {
        let method = parse_method(&self.method)?;
        let headers = header_map(&self.headers)?;

        let mut request = reqwest::blocking::Request::new(method, self.url);
        *request.headers_mut() = headers;
        *request.body_mut() = self.body.map(reqwest::blocking::Body::from);
        Ok(request)
    }

    /// Sends the request with the given client.
    ///
    /// # Errors
    ///
    /// Returns the conversion errors of [`into_reqwest`](Self::into_reqwest)
    /// and [`Error::Network`] if the transport fails.
    pub fn send(self, client: &reqwest::blocking::Client) -> Result<reqwest::blocking::Response> {
        tracing::debug!(
            method = %self.method,
            url = %self.url,
            "Sending request"
        );

        let request = self.into_reqwest()?;
        let response = client.execute(request)?;

        tracing::debug!(status = response.status().as_u16(), "Received response");
        Ok(response)
    }
}

fn parse_method(method: &str) -> Result<Method> {
    Method::from_bytes(method.as_bytes())
        .map_err(|e| Error::ConfigurationError(format!("Invalid method {:?}: {}", method, e)))
}

fn header_map(params: &Params) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, values) in params {
        let name = HeaderName::try_from(name.as_str())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        for value in values {
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
            headers.append(name.clone(), value);
        }
    }
    Ok(headers)
}
