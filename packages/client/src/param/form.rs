//! Multipart form bodies.
//!
//! A [`Form`] is an ordered list of [`FormPart`]s. Rendering produces the
//! `multipart/form-data` wire layout: each part opens with a boundary line
//! and a `Content-Disposition` header, parts are separated by `\r\n`, and
//! the body is terminated by `--boundary--\r\n`. Entries keep their
//! declaration order. An empty form renders nothing - no body and no
//! content type.

use std::path::PathBuf;

use bytes::{BufMut, Bytes, BytesMut};

const BREAK_LINE: &str = "\r\n";

/// Media type of a form entry or header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaType {
    /// `application/json`
    Json,
    /// `text/plain`
    Text,
    /// `text/html`
    Html,
    /// `application/xml`
    Xml,
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
    /// `image/gif`
    Gif,
    /// `application/pdf`
    Pdf,
    /// `application/octet-stream`
    OctetStream,
    /// Any other media type, verbatim.
    Custom(String),
}

impl MediaType {
    /// The wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            MediaType::Json => "application/json",
            MediaType::Text => "text/plain",
            MediaType::Html => "text/html",
            MediaType::Xml => "application/xml",
            MediaType::Png => "image/png",
            MediaType::Jpeg => "image/jpeg",
            MediaType::Gif => "image/gif",
            MediaType::Pdf => "application/pdf",
            MediaType::OctetStream => "application/octet-stream",
            MediaType::Custom(s) => s,
        }
    }
}

/// One entry of a multipart form.
#[derive(Debug, Clone)]
pub enum FormPart {
    /// In-memory file contents.
    Data {
        /// The raw payload.
        bytes: Bytes,
        /// File name reported in the disposition, e.g. `image.jpg`.
        file_name: String,
        /// Media type of the payload.
        media_type: MediaType,
    },
    /// A file referenced by path, read when the body is rendered.
    File {
        /// Path to the file on disk.
        path: PathBuf,
        /// Media type of the file contents.
        media_type: MediaType,
    },
    /// A scalar key/value field.
    Value {
        /// Field name.
        key: String,
        /// Field value, rendered as text.
        value: String,
    },
}

/// An ordered multipart form.
#[derive(Debug, Clone, Default)]
pub struct Form {
    parts: Vec<FormPart>,
}

/// The rendered wire form: the body bytes plus the content type carrying
/// the boundary marker.
#[derive(Debug, Clone)]
pub struct RenderedForm {
    /// `multipart/form-data; boundary=...`
    pub content_type: String,
    /// The complete multipart body.
    pub body: Bytes,
}

impl Form {
    /// A form over the given entries, in declaration order.
    #[must_use]
    pub fn new(parts: impl IntoIterator<Item = FormPart>) -> Self {
        Form {
            parts: parts.into_iter().collect(),
        }
    }

    /// Append one entry.
    pub fn push(&mut self, part: FormPart) {
        self.parts.push(part);
    }

    /// Whether the form has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Render the multipart body with a fresh random boundary.
    ///
    /// Returns `None` for an empty form, which must not contribute a body
    /// or a content type to the request.
    ///
    /// # Panics
    /// Panics when a [`FormPart::File`] path cannot be read or carries no
    /// file name. A dangling file reference is a configuration error, not
    /// a runtime request error.
    #[must_use]
    pub fn render(&self) -> Option<RenderedForm> {
        if self.parts.is_empty() {
            return None;
        }

        let boundary = format!(
            "request.boundary.{:08x}{:08x}",
            fastrand::u32(..),
            fastrand::u32(..)
        );

        let mut body = BytesMut::new();
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                body.put_slice(BREAK_LINE.as_bytes());
            }
            render_part(&mut body, part, &boundary);
        }
        body.put_slice(format!("{BREAK_LINE}--{boundary}--{BREAK_LINE}").as_bytes());

        Some(RenderedForm {
            content_type: format!("multipart/form-data; boundary={boundary}"),
            body: body.freeze(),
        })
    }
}

fn render_part(body: &mut BytesMut, part: &FormPart, boundary: &str) {
    body.put_slice(format!("--{boundary}{BREAK_LINE}").as_bytes());
    match part {
        FormPart::Data {
            bytes,
            file_name,
            media_type,
        } => {
            put_file_disposition(body, file_name, media_type);
            body.put_slice(BREAK_LINE.as_bytes());
            body.put_slice(bytes);
        }
        FormPart::File { path, media_type } => {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_else(|| {
                    panic!("form file {} does not carry a valid file name", path.display())
                })
                .to_owned();
            let contents = std::fs::read(path).unwrap_or_else(|e| {
                panic!("form file {} is not readable: {e}", path.display())
            });
            put_file_disposition(body, &file_name, media_type);
            body.put_slice(BREAK_LINE.as_bytes());
            body.put_slice(&contents);
        }
        FormPart::Value { key, value } => {
            body.put_slice(
                format!("Content-Disposition: form-data; name=\"{key}\"{BREAK_LINE}").as_bytes(),
            );
            body.put_slice(BREAK_LINE.as_bytes());
            body.put_slice(value.as_bytes());
        }
    }
}

/// Disposition lines for a file-carrying part. The field name is the file
/// name minus its final extension; a name with no extension is kept whole.
fn put_file_disposition(body: &mut BytesMut, file_name: &str, media_type: &MediaType) {
    let name = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };
    body.put_slice(
        format!(
            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"{BREAK_LINE}"
        )
        .as_bytes(),
    );
    body.put_slice(format!("Content-Type: {}{BREAK_LINE}", media_type.as_str()).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(form: &Form) -> (String, String) {
        let rendered = form.render().expect("non-empty form renders");
        (
            rendered.content_type,
            String::from_utf8(rendered.body.to_vec()).expect("test parts are UTF-8"),
        )
    }

    #[test]
    fn two_data_parts_render_two_dispositions_and_one_terminator() {
        let form = Form::new([
            FormPart::Data {
                bytes: Bytes::from_static(b"alpha"),
                file_name: "f.txt".into(),
                media_type: MediaType::Text,
            },
            FormPart::Data {
                bytes: Bytes::from_static(b"beta"),
                file_name: "g.txt".into(),
                media_type: MediaType::Text,
            },
        ]);
        let (content_type, body) = rendered_text(&form);

        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .expect("content type carries the boundary");
        assert_eq!(body.matches("Content-Disposition").count(), 2);
        assert_eq!(body.matches(&format!("--{boundary}--\r\n")).count(), 1);
        // Declaration order is preserved in the rendered body.
        assert!(body.find("alpha").unwrap() < body.find("beta").unwrap());
    }

    #[test]
    fn value_part_renders_key_without_content_type() {
        let form = Form::new([FormPart::Value {
            key: "name".into(),
            value: "test".into(),
        }]);
        let (_, body) = rendered_text(&form);
        assert!(body.contains("Content-Disposition: form-data; name=\"name\"\r\n"));
        assert!(!body.contains("Content-Type"));
        assert!(body.contains("\r\n\r\ntest"));
    }

    #[test]
    fn file_field_name_drops_the_extension() {
        let form = Form::new([FormPart::Data {
            bytes: Bytes::from_static(b"x"),
            file_name: "report.final.pdf".into(),
            media_type: MediaType::Pdf,
        }]);
        let (_, body) = rendered_text(&form);
        assert!(body.contains("name=\"report.final\"; filename=\"report.final.pdf\""));
        assert!(body.contains("Content-Type: application/pdf\r\n"));
    }

    #[test]
    fn extensionless_file_name_is_kept_whole() {
        let form = Form::new([FormPart::Data {
            bytes: Bytes::from_static(b"x"),
            file_name: "data".into(),
            media_type: MediaType::OctetStream,
        }]);
        let (_, body) = rendered_text(&form);
        assert!(body.contains("name=\"data\"; filename=\"data\""));
    }

    #[test]
    fn empty_form_renders_nothing() {
        assert!(Form::default().render().is_none());
    }

    #[test]
    #[should_panic(expected = "not readable")]
    fn dangling_file_reference_panics() {
        let form = Form::new([FormPart::File {
            path: PathBuf::from("/nonexistent/declareq-test-file"),
            media_type: MediaType::Text,
        }]);
        let _ = form.render();
    }
}
