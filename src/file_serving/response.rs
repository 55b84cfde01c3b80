use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use super::listing;
use super::DirectoryEntry;
use crate::status::StatusCode;

/// Header map with case-insensitive names. Setting an existing name replaces
/// its value in place, so the last write wins and order stays stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

pub enum Body {
    Bytes(Vec<u8>),
    Stream {
        reader: Box<dyn Read + Send>,
        len: u64,
    },
}

impl Body {
    /// Unencoded length in bytes.
    pub fn size(&self) -> u64 {
        match self {
            Body::Bytes(bytes) => bytes.len() as u64,
            Body::Stream { len, .. } => *len,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream { len, .. } => f.debug_struct("Stream").field("len", len).finish(),
        }
    }
}

/// Status, headers and body, ready for the writer.
#[derive(Debug)]
pub struct ResponseDescriptor {
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Body,
}

pub enum Response {
    Status {
        status: StatusCode,
        message: Option<String>,
    },
    File {
        path: PathBuf,
        size: u64,
        file: File,
    },
    Directory {
        html: String,
    },
}

impl Response {
    pub fn for_status(status: StatusCode, message: Option<&str>) -> Self {
        Response::Status {
            status,
            message: message.map(str::to_string),
        }
    }

    pub fn for_file(path: impl Into<PathBuf>, size: u64, file: File) -> Self {
        Response::File {
            path: path.into(),
            size,
            file,
        }
    }

    pub fn for_directory(root: &Path, path: &Path, entries: &[DirectoryEntry]) -> Self {
        Response::Directory {
            html: listing::render(root, path, entries),
        }
    }

    /// Directory response, or 500 when the listing could not be read.
    pub fn for_listing(
        root: &Path,
        path: &Path,
        listing: io::Result<Vec<DirectoryEntry>>,
    ) -> Self {
        match listing {
            Ok(entries) => Self::for_directory(root, path, &entries),
            Err(e) => {
                crate::log_error!(e, format!("Failed to list {}", path.display()));
                Self::for_status(StatusCode::InternalServerError, None)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Response::Status { status, .. } => *status,
            Response::File { .. } | Response::Directory { .. } => StatusCode::Ok,
        }
    }

    pub fn into_descriptor(self) -> ResponseDescriptor {
        let mut headers = Headers::new();
        match self {
            Response::Status { status, message } => {
                headers.set("Content-Type", "text/plain");
                let body = message.unwrap_or_else(|| status.as_u16().to_string());
                ResponseDescriptor {
                    status,
                    headers,
                    body: Body::Bytes(body.into_bytes()),
                }
            }
            Response::File { path, size, file } => {
                headers.set("Content-Type", "application/octet-stream");
                headers.set("Content-Disposition", content_disposition(&path));
                headers.set("Content-Length", size.to_string());
                ResponseDescriptor {
                    status: StatusCode::Ok,
                    headers,
                    body: Body::Stream {
                        reader: Box::new(file),
                        len: size,
                    },
                }
            }
            Response::Directory { html } => {
                headers.set("Content-Type", "text/html");
                ResponseDescriptor {
                    status: StatusCode::Ok,
                    headers,
                    body: Body::Bytes(html.into_bytes()),
                }
            }
        }
    }
}

/// `attachment; filename="..."` with quotes and backslashes escaped. Line
/// breaks would end the header early, so they become underscores.
pub fn content_disposition(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut quoted = String::with_capacity(name.len());
    for c in name.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\r' | '\n' => quoted.push('_'),
            _ => quoted.push(c),
        }
    }
    format!("attachment; filename=\"{}\"", quoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;
    use tempfile::TempDir;

    fn body_bytes(body: Body) -> Vec<u8> {
        match body {
            Body::Bytes(bytes) => bytes,
            Body::Stream { mut reader, .. } => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf).unwrap();
                buf
            }
        }
    }

    #[test]
    fn headers_are_case_insensitive_and_last_write_wins() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        headers.set("X-Other", "1");
        headers.set("content-type", "text/html");

        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec![("Content-Type", "text/html"), ("X-Other", "1")]
        );

        headers.remove("x-other");
        assert_eq!(headers.get("X-Other"), None);
    }

    #[rstest]
    #[case(StatusCode::NotFound, None, "404")]
    #[case(StatusCode::NotImplemented, None, "501")]
    #[case(StatusCode::BadRequest, Some("bad request line"), "bad request line")]
    fn status_responses_are_plain_text(
        #[case] status: StatusCode,
        #[case] message: Option<&str>,
        #[case] expected: &str,
    ) {
        let descriptor = Response::for_status(status, message).into_descriptor();
        assert_eq!(descriptor.status, status);
        assert_eq!(descriptor.headers.get("content-type"), Some("text/plain"));
        assert_eq!(body_bytes(descriptor.body), expected.as_bytes());
    }

    #[test]
    fn file_responses_stream_with_download_headers() -> io::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("report.bin");
        fs::write(&path, b"\x00\x01binary")?;

        let response = Response::for_file(&path, 8, File::open(&path)?);
        assert_eq!(response.status(), StatusCode::Ok);

        let descriptor = response.into_descriptor();
        assert_eq!(
            descriptor.headers.get("Content-Type"),
            Some("application/octet-stream")
        );
        assert_eq!(
            descriptor.headers.get("Content-Disposition"),
            Some("attachment; filename=\"report.bin\"")
        );
        assert_eq!(descriptor.headers.get("Content-Length"), Some("8"));
        assert!(matches!(descriptor.body, Body::Stream { len: 8, .. }));
        assert_eq!(body_bytes(descriptor.body), b"\x00\x01binary");
        Ok(())
    }

    #[rstest]
    #[case("/x/plain.txt", "attachment; filename=\"plain.txt\"")]
    #[case("/x/say \"hi\" \"twice\"", r#"attachment; filename="say \"hi\" \"twice\"""#)]
    #[case("/x/back\\slash", r#"attachment; filename="back\\slash""#)]
    #[case("/x/line\r\nbreak", "attachment; filename=\"line__break\"")]
    fn disposition_escapes_the_basename(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(content_disposition(Path::new(path)), expected);
    }

    #[test]
    fn directory_responses_are_html() {
        let root = Path::new("/r");
        let entries = [DirectoryEntry {
            full_path: root.join("a.txt"),
            base_name: "a.txt".to_string(),
        }];
        let descriptor = Response::for_directory(root, root, &entries).into_descriptor();
        assert_eq!(descriptor.status, StatusCode::Ok);
        assert_eq!(descriptor.headers.get("Content-Type"), Some("text/html"));
        let html = String::from_utf8(body_bytes(descriptor.body)).unwrap();
        assert!(html.contains("<li><a href=\"/a.txt\">a.txt</a></li>"));
    }

    #[test]
    fn listing_failure_is_a_500() {
        let root = Path::new("/r");
        let listing = Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let descriptor = Response::for_listing(root, root, listing).into_descriptor();
        assert_eq!(descriptor.status, StatusCode::InternalServerError);
        assert_eq!(descriptor.headers.get("Content-Type"), Some("text/plain"));
        let body = String::from_utf8(body_bytes(descriptor.body)).unwrap();
        assert!(body.contains("500"));
    }
}
