//! Payload shapes accepted by the body and form setters.

use crate::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::Read;

/// One payload value handed to the builder.
///
/// Each accepted shape has its own variant, so the setters match on the
/// variant instead of inspecting types at runtime.
///
/// # Examples
///
/// ```
/// use reqkit::Content;
/// use std::io::Cursor;
///
/// let text = Content::text("hello");
/// let borrowed = Content::from(&String::from("hello"));
/// let stream = Content::stream(Cursor::new(b"raw bytes".to_vec()));
/// let json = Content::json(&serde_json::json!({"name": "wonder woman"})).unwrap();
///
/// assert_eq!(text.kind(), "string");
/// assert_eq!(borrowed.kind(), "string");
/// assert_eq!(stream.kind(), "stream");
/// assert_eq!(json.kind(), "object");
/// ```
pub enum Content {
    /// Text used verbatim.
    Text(String),

    /// A byte source read lazily by the transport.
    Stream(Box<dyn Read + Send>),

    /// A structured value, JSON-encoded where the slot calls for it.
    Json(Value),
}

impl Content {
    /// Creates text content.
    pub fn text(value: impl Into<String>) -> Self {
        Content::Text(value.into())
    }

    /// Creates stream content from any reader.
    ///
    /// The reader is not consumed until the built request body is read.
    pub fn stream<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Content::Stream(Box::new(reader))
    }

    /// Creates structured content from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if the value cannot be
    /// represented as JSON, for example a map with non-string keys.
    pub fn json<T>(value: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::SerializationFailed(e.to_string()))?;
        Ok(Content::Json(value))
    }

    /// Returns the name of this content's kind.
    ///
    /// Structured values report their JSON kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "string",
            Content::Stream(_) => "stream",
            Content::Json(value) => json_kind(value),
        }
    }

    /// Returns `true` for plain text content.
    pub fn is_text(&self) -> bool {
        matches!(self, Content::Text(_))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Content::Stream(_) => f.debug_tuple("Stream").field(&"..").finish(),
            Content::Json(value) => f.debug_tuple("Json").field(value).finish(),
        }
    }
}

impl From<String> for Content {
    fn from(value: String) -> Self {
        Content::Text(value)
    }
}

impl From<&str> for Content {
    fn from(value: &str) -> Self {
        Content::Text(value.to_owned())
    }
}

impl From<&String> for Content {
    fn from(value: &String) -> Self {
        Content::Text(value.clone())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Content::Json(value)
    }
}

impl From<Box<dyn Read + Send>> for Content {
    fn from(reader: Box<dyn Read + Send>) -> Self {
        Content::Stream(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde_json::json;
    use std::collections::HashMap;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(S::Error::custom("channels cannot be serialized"))
        }
    }

    #[test]
    fn test_json_kinds() {
        assert_eq!(Content::json(&200).unwrap().kind(), "number");
        assert_eq!(Content::json(&true).unwrap().kind(), "bool");
        assert_eq!(Content::json(&vec![1, 2]).unwrap().kind(), "array");
        assert_eq!(Content::json(&()).unwrap().kind(), "null");
        assert_eq!(Content::from(json!({"a": 1})).kind(), "object");
    }

    #[test]
    fn test_json_rejects_unserializable_values() {
        let err = Content::json(&Unserializable).unwrap_err();
        assert!(matches!(err, Error::SerializationFailed(ref msg) if msg.contains("channels")));

        let mut map = HashMap::new();
        map.insert(vec![1u8], "value");
        assert!(matches!(
            Content::json(&map),
            Err(Error::SerializationFailed(_))
        ));
    }

    #[test]
    fn test_string_conversions() {
        let owned = String::from("hello SDK");
        assert!(Content::from(&owned).is_text());
        assert!(Content::from(owned).is_text());
        assert!(Content::from("literal").is_text());
    }

    #[test]
    fn test_boxed_reader_becomes_stream() {
        let reader: Box<dyn Read + Send> = Box::new(std::io::Cursor::new(b"boxed".to_vec()));
        let content = Content::from(reader);
        assert_eq!(content.kind(), "stream");
        assert!(!content.is_text());

        let Content::Stream(mut reader) = content else {
            panic!("expected a stream");
        };
        let mut read = Vec::new();
        reader.read_to_end(&mut read).unwrap();
        assert_eq!(read, b"boxed");
    }

    #[test]
    fn test_debug_hides_stream() {
        let content = Content::stream(std::io::empty());
        assert_eq!(format!("{:?}", content), "Stream(\"..\")");
    }
}
