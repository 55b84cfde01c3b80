use percent_encoding::percent_decode_str;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use super::{DirectoryEntry, ResolvedTarget, TargetKind};
use crate::logging::LoggingExt;

/// Percent-decodes a request path. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_request_path(request_path: &str) -> String {
    percent_decode_str(request_path)
        .decode_utf8_lossy()
        .into_owned()
}

/// Maps a decoded request path onto `base_dir` and stats the result.
///
/// `base_dir` must already be canonical. `..` is applied lexically but can
/// never climb above `base_dir`, and the canonicalized result must still lie
/// under `base_dir`; a path that escapes (e.g. through a symlink) resolves to
/// `NotFound`.
pub fn resolve(base_dir: &Path, request_path: &str) -> ResolvedTarget {
    let start_time = Instant::now();

    let mut cleaned_path = PathBuf::new();
    for component in Path::new(request_path).components() {
        match component {
            Component::Normal(name) => cleaned_path.push(name),
            // Popping an empty path is a no-op, so `..` stops at the root
            Component::ParentDir => {
                cleaned_path.pop();
            }
            // Leading `/`, `.` and drive prefixes carry no location
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    log::debug!("Cleaned path: {}", cleaned_path.display());

    let requested_path = base_dir.join(&cleaned_path);

    let path = match requested_path
        .as_path()
        .log_operation("canonicalize", || fs::canonicalize(&requested_path))
    {
        Ok(path) if path.starts_with(base_dir) => path,
        Ok(path) => {
            log::warn!("Path escapes base directory: {}", path.display());
            return not_found(requested_path);
        }
        Err(_) => return not_found(requested_path),
    };

    let target = match path.as_path().log_operation("stat", || fs::metadata(&path)) {
        Err(_) => not_found(path),
        Ok(metadata) if metadata.is_dir() => ResolvedTarget {
            path,
            kind: TargetKind::Directory,
            size: None,
        },
        Ok(metadata) if metadata.is_file() => ResolvedTarget {
            path,
            kind: TargetKind::RegularFile,
            size: Some(metadata.len()),
        },
        Ok(_) => ResolvedTarget {
            path,
            kind: TargetKind::Other,
            size: None,
        },
    };

    log::debug!(
        "Resolved {} to {:?} in {:?}",
        target.path.display(),
        target.kind,
        start_time.elapsed()
    );
    target
}

fn not_found(path: PathBuf) -> ResolvedTarget {
    ResolvedTarget {
        path,
        kind: TargetKind::NotFound,
        size: None,
    }
}

/// Lists `dir` in whatever order the filesystem returns.
pub fn list_directory(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
    dir.log_operation("read_dir", || {
        fs::read_dir(dir)?
            .map(|entry| -> io::Result<DirectoryEntry> {
                let name = entry?.file_name();
                Ok(DirectoryEntry {
                    full_path: dir.join(&name),
                    base_name: name.to_string_lossy().into_owned(),
                })
            })
            .collect()
    })
}
