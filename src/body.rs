//! Request body representation.
//!
//! A [`Body`] is either an in-memory buffer or a reader that the transport
//! pulls from. Stream-backed bodies are never buffered by this crate.

use crate::Result;
use std::fmt;
use std::io::{self, Cursor, Read};

/// A readable request body.
///
/// # Examples
///
/// ```
/// use reqkit::Body;
/// use std::io::Read;
///
/// let mut body = Body::from("hello");
/// assert_eq!(body.len(), Some(5));
///
/// let mut text = String::new();
/// body.read_to_string(&mut text).unwrap();
/// assert_eq!(text, "hello");
/// ```
pub struct Body {
    kind: Kind,
}

enum Kind {
    Bytes(Cursor<Vec<u8>>),
    Reader(Box<dyn Read + Send>),
}

impl Body {
    /// Creates a body backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Kind::Bytes(Cursor::new(bytes.into())),
        }
    }

    /// Creates a body that reads lazily from `reader`.
    pub fn from_reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::from_boxed_reader(Box::new(reader))
    }

    pub(crate) fn from_boxed_reader(reader: Box<dyn Read + Send>) -> Self {
        Self {
            kind: Kind::Reader(reader),
        }
    }

    /// Returns the number of bytes left to read, if known.
    ///
    /// Only in-memory bodies have a known length.
    pub fn len(&self) -> Option<u64> {
        match &self.kind {
            Kind::Bytes(cursor) => {
                let total = cursor.get_ref().len() as u64;
                Some(total.saturating_sub(cursor.position()))
            }
            Kind::Reader(_) => None,
        }
    }

    /// Returns `true` if an in-memory body has nothing left to read.
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Returns `true` if the body pulls from a reader.
    pub fn is_stream(&self) -> bool {
        matches!(self.kind, Kind::Reader(_))
    }

    /// Returns the unread in-memory bytes, or `None` for a stream.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match &self.kind {
            Kind::Bytes(cursor) => {
                let start = (cursor.position() as usize).min(cursor.get_ref().len());
                Some(&cursor.get_ref()[start..])
            }
            Kind::Reader(_) => None,
        }
    }

    /// Reads the rest of the body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the underlying stream fails.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        match self.kind {
            Kind::Bytes(cursor) => {
                let start = cursor.position() as usize;
                let mut bytes = cursor.into_inner();
                bytes.drain(..start.min(bytes.len()));
                Ok(bytes)
            }
            Kind::Reader(mut reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                Ok(bytes)
            }
        }
    }
}

impl Read for Body {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Bytes(cursor) => cursor.read(buf),
            Kind::Reader(reader) => reader.read(buf),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Bytes(_) => f.debug_struct("Body").field("len", &self.len()).finish(),
            Kind::Reader(_) => f.debug_struct("Body").field("stream", &true).finish(),
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::from_bytes(bytes)
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::from_bytes(text.into_bytes())
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::from_bytes(text.as_bytes())
    }
}

impl From<Body> for reqwest::blocking::Body {
    fn from(body: Body) -> Self {
        match body.kind {
            Kind::Bytes(cursor) => {
                let start = cursor.position() as usize;
                let mut bytes = cursor.into_inner();
                bytes.drain(..start.min(bytes.len()));
                reqwest::blocking::Body::from(bytes)
            }
            Kind::Reader(reader) => reqwest::blocking::Body::new(reader),
        }
    }
}
