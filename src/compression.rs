#[derive(Debug, PartialEq, Copy, Clone)]
pub enum CompressionType {
    Zstd,
    Gzip,
    None,
}

impl CompressionType {
    /// Value for the `Content-Encoding` header, if any.
    pub fn content_encoding(self) -> Option<&'static str> {
        match self {
            CompressionType::Zstd => Some("zstd"),
            CompressionType::Gzip => Some("gzip"),
            CompressionType::None => None,
        }
    }
}

#[derive(Debug, Default, PartialEq, Copy, Clone)]
pub struct AcceptedCompression {
    pub supports_zstd: bool,
    pub supports_gzip: bool,
}

impl AcceptedCompression {
    pub fn preferred(self) -> CompressionType {
        if self.supports_zstd {
            CompressionType::Zstd
        } else if self.supports_gzip {
            CompressionType::Gzip
        } else {
            CompressionType::None
        }
    }
}

pub fn determine_compression(accept_encoding: &str) -> AcceptedCompression {
    let binding = accept_encoding.to_lowercase();
    let mut accepted = AcceptedCompression::default();
    let mut wildcard = false;
    let mut refused_zstd = false;
    let mut refused_gzip = false;

    for entry in binding.split(',') {
        let mut params = entry.split(';').map(|s| s.trim());
        let coding = params.next().unwrap_or("");
        let refused = params.any(|p| {
            p.strip_prefix("q=")
                .and_then(|q| q.trim().parse::<f32>().ok())
                .map(|q| q <= 0.0)
                .unwrap_or(false)
        });
        match (coding, refused) {
            ("zstd", false) => accepted.supports_zstd = true,
            ("zstd", true) => refused_zstd = true,
            ("gzip" | "x-gzip", false) => accepted.supports_gzip = true,
            ("gzip" | "x-gzip", true) => refused_gzip = true,
            ("*", false) => wildcard = true,
            _ => {}
        }
    }

    // `*` covers any coding not explicitly refused
    if wildcard {
        accepted.supports_zstd |= !refused_zstd;
        accepted.supports_gzip |= !refused_gzip;
    }

    accepted
}
