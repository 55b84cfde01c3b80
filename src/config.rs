use regex::Regex;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::args::Args;
use crate::compression::{AcceptedCompression, CompressionType};

#[derive(Debug, Clone)]
pub struct CompressionSettings {
    pub enabled: bool,
    pub gzip_level: u32,
    pub zstd_level: i32,
    pub bypass_patterns: Vec<Regex>,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            gzip_level: 6,
            zstd_level: 3,
            bypass_patterns: Vec::new(),
        }
    }
}

impl CompressionSettings {
    pub fn should_bypass(&self, request_path: &str) -> bool {
        self.bypass_patterns
            .iter()
            .any(|pattern| pattern.is_match(request_path))
    }

    /// Picks the coding for one response given what the client accepts.
    pub fn select(&self, request_path: &str, accepted: AcceptedCompression) -> CompressionType {
        if !self.enabled {
            return CompressionType::None;
        }
        if self.should_bypass(request_path) {
            log::debug!(
                "Path '{}' matches bypass pattern, skipping compression",
                request_path
            );
            return CompressionType::None;
        }
        accepted.preferred()
    }
}

/// Startup configuration. Built once, then shared read-only by every connection.
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub compression: CompressionSettings,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>, compression: CompressionSettings) -> io::Result<Self> {
        let root = root.into();
        let root = fs::canonicalize(&root).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("cannot use {} as document root: {}", root.display(), e),
            )
        })?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("document root is not a directory: {}", root.display()),
            ));
        }
        Ok(Self { root, compression })
    }
}

impl TryFrom<&Args> for Config {
    type Error = io::Error;

    fn try_from(args: &Args) -> io::Result<Self> {
        let bypass_patterns = args
            .bypass_compression
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
            })
            .collect::<io::Result<Vec<_>>>()?;

        Config::new(
            &args.serve_dir,
            CompressionSettings {
                enabled: !args.no_compression,
                gzip_level: args.gzip_level,
                zstd_level: args.zstd_level,
                bypass_patterns,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn root_is_canonicalized() -> io::Result<()> {
        let dir = TempDir::new()?;
        fs::create_dir(dir.path().join("sub"))?;
        let config = Config::new(dir.path().join("sub/../sub"), CompressionSettings::default())?;
        assert_eq!(config.root, fs::canonicalize(dir.path().join("sub"))?);
        Ok(())
    }

    #[test]
    fn missing_or_non_directory_root_is_rejected() -> io::Result<()> {
        let dir = TempDir::new()?;
        let file = dir.path().join("plain.txt");
        fs::write(&file, "x")?;

        assert!(Config::new(dir.path().join("nope"), CompressionSettings::default()).is_err());
        let err = Config::new(&file, CompressionSettings::default()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        Ok(())
    }

    #[test]
    fn invalid_bypass_regex_fails_startup() -> io::Result<()> {
        let dir = TempDir::new()?;
        let serve_dir = dir.path().to_string_lossy().into_owned();
        let args = Args::parse_from(["dirserve", "-s", &serve_dir, "-b", "("]);
        assert!(Config::try_from(&args).is_err());
        Ok(())
    }

    #[test]
    fn selection_honours_switches_and_bypass() -> io::Result<()> {
        let accepted = AcceptedCompression {
            supports_zstd: false,
            supports_gzip: true,
        };
        let mut settings = CompressionSettings {
            bypass_patterns: vec![Regex::new(r"\.png$").unwrap()],
            ..CompressionSettings::default()
        };

        assert_eq!(settings.select("/a.txt", accepted), CompressionType::Gzip);
        assert_eq!(settings.select("/img/a.png", accepted), CompressionType::None);

        settings.enabled = false;
        assert_eq!(settings.select("/a.txt", accepted), CompressionType::None);
        Ok(())
    }
}
