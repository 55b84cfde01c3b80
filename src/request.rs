use std::io::{self, BufRead};

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Reads the request line and headers. `Ok(None)` means the peer closed
    /// the connection before sending anything.
    pub fn read_from<R: BufRead>(reader: &mut R) -> io::Result<Option<Request>> {
        let mut first_line = String::new();
        if reader.read_line(&mut first_line)? == 0 {
            return Ok(None);
        }

        let mut parts = first_line.split_whitespace();
        let (method, target) = match (parts.next(), parts.next(), parts.next()) {
            (Some(method), Some(target), Some(version)) if version.starts_with("HTTP/") => {
                (method.to_string(), target.to_string())
            }
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed request line: {:?}", first_line.trim()),
                ))
            }
        };

        let mut headers = Vec::new();
        let mut line = String::new();
        while {
            line.clear();
            reader.read_line(&mut line)? > 0 && !line.trim().is_empty()
        } {
            log::trace!("Header line: {}", line.trim());
            if let Some((key, value)) = line.split_once(':') {
                headers.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Some(Request {
            method,
            target,
            headers,
        }))
    }

    /// Request target without its query string.
    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or(&self.target)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
