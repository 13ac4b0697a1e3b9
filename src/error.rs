//! Error types for request assembly.
//!
//! Every fallible builder call returns [`Error`] to its immediate caller.
//! Nothing is retried or recovered internally, and a failed call never
//! commits a partial URL or body.

/// The main error type for building requests.
///
/// # Examples
///
/// ```
/// use reqkit::{Content, Error, RequestBuilder};
///
/// let mut builder = RequestBuilder::new("POST");
/// let number = Content::json(&200).unwrap();
///
/// match builder.set_body_content("", None, None, Some(number)) {
///     Err(Error::UnsupportedContentType { kind, .. }) => assert_eq!(kind, "number"),
///     other => panic!("unexpected result: {:?}", other.map(|_| ())),
/// }
/// assert!(builder.body().is_none());
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The endpoint passed to `construct_http_url` is not a valid absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A value could not be encoded as JSON.
    ///
    /// Raised by `set_body_content_json`, `Content::json`, and by `build()`
    /// when a structured form field fails to encode.
    #[error("Failed to serialize request body: {0}")]
    SerializationFailed(String),

    /// A `set_body_content` slot was given a kind of content it does not accept.
    ///
    /// # Fields
    ///
    /// * `slot` - Which slot rejected the content (`"JSON"` or `"non-JSON"`)
    /// * `kind` - The name of the rejected kind, e.g. `"number"` or `"stream"`
    #[error("Invalid type for {slot} body content: {kind}")]
    UnsupportedContentType {
        /// The slot that rejected the content.
        slot: &'static str,
        /// The name of the rejected content kind.
        kind: &'static str,
    },

    /// The request could not be assembled from the accumulated configuration.
    ///
    /// Covers a missing URL at build time and invalid methods, header names
    /// or header values when converting for a transport.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Reading from a caller-supplied stream failed.
    #[error("I/O error while reading body: {0}")]
    Io(#[from] std::io::Error),

    /// The transport failed to execute a built request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl Error {
    /// Returns `true` if the error came from assembling the request rather
    /// than from the transport or the body's underlying stream.
    ///
    /// ```
    /// use reqkit::Error;
    ///
    /// assert!(Error::ConfigurationError("no url".into()).is_client_side());
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
    /// assert!(!Error::from(io).is_client_side());
    /// ```
    pub fn is_client_side(&self) -> bool {
        match self {
            Error::InvalidUrl(_) => true,
            Error::SerializationFailed(_) => true,
            Error::UnsupportedContentType { .. } => true,
            Error::ConfigurationError(_) => true,
            Error::Io(_) => false,
            Error::Network(_) => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationFailed(err.to_string())
    }
}

/// A specialized `Result` type for request assembly.
pub type Result<T> = std::result::Result<T, Error>;
