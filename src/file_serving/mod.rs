pub mod handlers;
pub mod listing;
mod path_utils;
pub mod response;
pub mod writer;

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    NotFound,
    Directory,
    RegularFile,
    Other,
}

/// What a request path points at, from a fresh stat of the filesystem.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
    /// Byte length, only for regular files.
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryEntry {
    pub full_path: PathBuf,
    pub base_name: String,
}

#[cfg(test)]
pub(crate) mod test_util;
