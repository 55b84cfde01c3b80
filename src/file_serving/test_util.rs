use flate2::read::GzDecoder;
use std::io::Read;

use super::response::Headers;

pub struct ParsedResponse {
    pub status: u16,
    pub headers: Headers,
    /// Body with chunking and content encoding undone.
    pub body: Vec<u8>,
}

pub fn parse_response(raw: &[u8]) -> ParsedResponse {
    let split = raw
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("end of head");
    let head = std::str::from_utf8(&raw[..split]).expect("utf-8 head");
    let mut body = raw[split + 4..].to_vec();

    let mut lines = head.split("\r\n");
    let status = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .expect("status code");

    let mut headers = Headers::new();
    for line in lines {
        let (key, value) = line.split_once(':').expect("header line");
        headers.set(key.trim(), value.trim());
    }

    if let Some(length) = headers.get("Content-Length") {
        assert_eq!(length.parse::<usize>().unwrap(), body.len());
    }
    if headers.get("Transfer-Encoding") == Some("chunked") {
        body = dechunk(&body);
    }
    body = match headers.get("Content-Encoding") {
        Some("gzip") => {
            let mut decoded = Vec::new();
            GzDecoder::new(&body[..])
                .read_to_end(&mut decoded)
                .expect("gzip body");
            decoded
        }
        Some("zstd") => zstd::stream::decode_all(&body[..]).expect("zstd body"),
        Some(other) => panic!("unexpected encoding {}", other),
        None => body,
    };

    ParsedResponse {
        status,
        headers,
        body,
    }
}

/// Decodes a complete chunked body, panicking on framing errors or a missing
/// final chunk.
pub fn dechunk(mut raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let line_end = raw
            .windows(2)
            .position(|w| w == b"\r\n")
            .expect("chunk size line");
        let size_str = std::str::from_utf8(&raw[..line_end]).expect("chunk size");
        let size = usize::from_str_radix(size_str.trim(), 16).expect("hex chunk size");
        raw = &raw[line_end + 2..];
        if size == 0 {
            assert_eq!(raw, b"\r\n", "trailing bytes after last chunk");
            return out;
        }
        out.extend_from_slice(&raw[..size]);
        assert_eq!(&raw[size..size + 2], b"\r\n");
        raw = &raw[size + 2..];
    }
}

/// Deterministic bytes that do not compress well.
pub fn pseudo_random_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect()
}
