//! Form fields and their encoding as multipart/form-data or
//! application/x-www-form-urlencoded bodies.

use crate::{Body, Content, Error, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::fmt;

/// Content type used for file parts that do not declare one.
pub const DEFAULT_FILE_CONTENT_TYPE: &str = "application/octet-stream";

/// One field added with `add_form_data`.
pub struct FormPart {
    field_name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    content: Content,
}

impl FormPart {
    pub(crate) fn new(
        field_name: impl Into<String>,
        file_name: &str,
        content_type: &str,
        content: Content,
    ) -> Self {
        let file_name = (!file_name.is_empty()).then(|| file_name.to_owned());
        let content_type = match (content_type.is_empty(), file_name.is_some()) {
            (false, _) => Some(content_type.to_owned()),
            (true, true) => Some(DEFAULT_FILE_CONTENT_TYPE.to_owned()),
            (true, false) => None,
        };

        Self {
            field_name: field_name.into(),
            file_name,
            content_type,
            content,
        }
    }

    /// The form field name.
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// The file name, for file parts.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The part's content type, if one applies.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The part's value.
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// A simple field carries text and no file name.
    pub fn is_simple(&self) -> bool {
        self.file_name.is_none() && self.content.is_text()
    }

    fn into_part(self) -> Result<(String, Part)> {
        let FormPart {
            field_name,
            file_name,
            content_type,
            content,
        } = self;

        let mut part = match content {
            Content::Text(text) => Part::text(text),
            Content::Stream(reader) => Part::reader(reader),
            Content::Json(value) => {
                let bytes = serde_json::to_vec(&value).map_err(|e| {
                    Error::SerializationFailed(format!("form field `{}`: {}", field_name, e))
                })?;
                Part::bytes(bytes)
            }
        };

        if let Some(file_name) = file_name {
            part = part.file_name(file_name);
        }
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type).map_err(|e| {
                Error::ConfigurationError(format!(
                    "Invalid content type {:?} for form field `{}`: {}",
                    content_type, field_name, e
                ))
            })?;
        }

        Ok((field_name, part))
    }
}

impl fmt::Debug for FormPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("FormPart");
        dbg.field("field_name", &self.field_name);
        if let Some(file_name) = &self.file_name {
            dbg.field("file_name", file_name);
        }
        if let Some(content_type) = &self.content_type {
            dbg.field("content_type", content_type);
        }
        dbg.field("content", &self.content).finish()
    }
}

/// Builds a multipart form from the parts, in order.
pub(crate) fn into_form(parts: Vec<FormPart>) -> Result<Form> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        let (name, part) = part.into_part()?;
        Ok(form.part(name, part))
    })
}

/// The `Content-Type` header value announcing the form's boundary.
pub(crate) fn content_type(form: &Form) -> String {
    format!("multipart/form-data; boundary={}", form.boundary())
}

/// Turns the form into a body. Part values stay unread until the body is pulled.
pub(crate) fn into_body(form: Form) -> Body {
    Body::from_reader(form.into_reader())
}

/// Encodes simple text fields as `application/x-www-form-urlencoded`.
///
/// Returns `None` if any part is not a simple text field.
pub(crate) fn encode_urlencoded(parts: &[FormPart]) -> Option<String> {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for part in parts {
        match &part.content {
            Content::Text(text) if part.is_simple() => {
                serializer.append_pair(&part.field_name, text);
            }
            _ => return None,
        }
    }
    Some(serializer.finish())
}
