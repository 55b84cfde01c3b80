use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Serve a directory over HTTP", long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// Document root; request paths are resolved relative to it
    #[arg(short, long, default_value = ".")]
    pub serve_dir: PathBuf,

    #[arg(short, long, default_value = "3")]
    pub zstd_level: i32,

    #[arg(short, long, default_value = "6", value_parser = clap::value_parser!(u32).range(0..=9))]
    pub gzip_level: u32,

    /// Regex matched against the request path; matching paths are sent uncompressed
    #[arg(short, long = "bypass-compression", value_name = "REGEX")]
    pub bypass_compression: Vec<String>,

    #[arg(long)]
    pub no_compression: bool,
}
