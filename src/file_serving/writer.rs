use flate2::write::GzEncoder;
use flate2::Compression as GzipCompression;
use std::io::{self, Read, Write};
use zstd::stream::write::Encoder as ZstdEncoder;

use super::response::{Body, Response};
use crate::compression::CompressionType;
use crate::config::CompressionSettings;

/// Wraps every write in one HTTP/1.1 chunk. `finish` sends the last chunk.
pub struct ChunkedWriter<W: Write> {
    inner: W,
}

impl<W: Write> ChunkedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn finish(mut self) -> io::Result<W> {
        self.inner.write_all(b"0\r\n\r\n")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

impl<W: Write> Write for ChunkedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        // Size line, data and CRLF go out as one frame
        let size_line = format!("{:X}\r\n", buf.len());
        let mut frame = Vec::with_capacity(size_line.len() + buf.len() + 2);
        frame.extend_from_slice(size_line.as_bytes());
        frame.extend_from_slice(buf);
        frame.extend_from_slice(b"\r\n");
        self.inner.write_all(&frame)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    count: u64,
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.count += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Sends `response` to `sink`: the whole head in one write, then the body,
/// encoded with `compression`. Returns the unencoded body size and the number
/// of body bytes put on the wire.
///
/// Identity bodies carry `Content-Length`. Compressed bodies drop it and go
/// out chunked, with compressor output forwarded as it is produced. An error
/// after the head has been written leaves the response truncated; the caller
/// is expected to drop the connection.
pub fn write_response<W: Write>(
    sink: &mut W,
    response: Response,
    compression: CompressionType,
    settings: &CompressionSettings,
) -> io::Result<(u64, u64)> {
    let descriptor = response.into_descriptor();
    let mut headers = descriptor.headers;
    let body = descriptor.body;
    let body_size = body.size();

    // Compressed size is unknown up front, so compressed bodies are chunked
    match compression.content_encoding() {
        Some(encoding) => {
            headers.remove("Content-Length");
            headers.set("Content-Encoding", encoding);
            headers.set("Transfer-Encoding", "chunked");
        }
        None => headers.set("Content-Length", body_size.to_string()),
    }
    headers.set("Connection", "close");

    let mut head = format!("HTTP/1.1 {}\r\n", descriptor.status);
    for (key, value) in headers.iter() {
        head.push_str(&format!("{}: {}\r\n", key, value));
    }
    head.push_str("\r\n");
    // Head goes out in a single write, before any body byte
    sink.write_all(head.as_bytes())?;

    let mut counted = CountingWriter {
        inner: &mut *sink,
        count: 0,
    };

    match compression {
        CompressionType::None => copy_body(body, &mut counted)?,
        CompressionType::Gzip => {
            let mut encoder = GzEncoder::new(
                ChunkedWriter::new(&mut counted),
                GzipCompression::new(settings.gzip_level),
            );
            copy_body(body, &mut encoder)?;
            encoder.finish()?.finish()?;
        }
        CompressionType::Zstd => {
            let mut encoder =
                ZstdEncoder::new(ChunkedWriter::new(&mut counted), settings.zstd_level)?;
            copy_body(body, &mut encoder)?;
            encoder.finish()?.finish()?;
        }
    }

    counted.flush()?;
    Ok((body_size, counted.count))
}

fn copy_body<W: Write>(body: Body, writer: &mut W) -> io::Result<()> {
    match body {
        Body::Bytes(bytes) => writer.write_all(&bytes),
        Body::Stream { reader, len } => {
            let copied = io::copy(&mut reader.take(len), writer)?;
            if copied < len {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file ended after {} of {} bytes", copied, len),
                ));
            }
            Ok(())
        }
    }
}
