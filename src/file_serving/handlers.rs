use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Instant;

use super::path_utils::{decode_request_path, list_directory, resolve};
use super::response::Response;
use super::writer::write_response;
use super::TargetKind;
use crate::compression::determine_compression;
use crate::config::Config;
use crate::request::Request;
use crate::status::StatusCode;
use crate::{log_error, log_request, log_response};

/// Resolves `request_path` under `root` and picks the response for what it
/// finds. Filesystem errors become status responses here.
pub fn build_response(root: &Path, request_path: &str) -> Response {
    let decoded_path = decode_request_path(request_path);
    let target = resolve(root, &decoded_path);

    match target.kind {
        TargetKind::NotFound => Response::for_status(StatusCode::NotFound, None),
        TargetKind::Directory => {
            let listing = list_directory(&target.path);
            Response::for_listing(root, &target.path, listing)
        }
        // Opened here so a vanished file is still answered before the head goes out
        TargetKind::RegularFile => match File::open(&target.path) {
            Ok(file) => Response::for_file(target.path, target.size.unwrap_or(0), file),
            Err(e) => {
                log_error!(e, format!("Failed to open {}", target.path.display()));
                let status = if e.kind() == io::ErrorKind::NotFound {
                    StatusCode::NotFound
                } else {
                    StatusCode::InternalServerError
                };
                Response::for_status(status, None)
            }
        },
        TargetKind::Other => {
            log::debug!("Not a file or directory: {}", target.path.display());
            Response::for_status(StatusCode::NotImplemented, None)
        }
    }
}

/// Answers one request on `sink`. Never fails: a stream error is logged and
/// the response is left truncated for the caller to close.
pub fn handle_request<W: Write>(config: &Config, request: &Request, sink: &mut W) {
    let start_time = Instant::now();
    log_request!(request.method, request.target);

    // Query string plays no part in resolution
    let request_path = request.path();
    let accepted = determine_compression(request.header("Accept-Encoding").unwrap_or(""));
    let compression = config.compression.select(request_path, accepted);

    let response = build_response(&config.root, request_path);
    let status = response.status();

    match write_response(sink, response, compression, &config.compression) {
        Ok((original_size, final_size)) => {
            log_response!(status, start_time.elapsed(), original_size, final_size)
        }
        Err(e) => log_error!(e, format!("Stream failure on {}", request.target)),
    }
}
