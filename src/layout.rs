//! On-disk layout of a mirror.
//!
//! ```text
//! {target}/{kind}.json                      flat kinds
//! {target}/{kind}/{id / 1000}/{id}.json     per-identifier kinds
//! {target}/images/...                       downloaded media
//! ```

use std::path::{Path, PathBuf};

/// Number of consecutive identifiers stored per bucket directory.
pub const BUCKET_SIZE: u64 = 1000;

/// Subdirectory of the target directory that holds downloaded images.
pub const IMAGES_SUBDIR: &str = "images";

/// Returns the bucket directory index for an identifier.
#[must_use]
pub fn bucket_for(id: u64) -> u64 {
    id / BUCKET_SIZE
}

/// Path of the single JSON file holding a flat resource kind.
#[must_use]
pub fn flat_resource_path(target_dir: &Path, kind: &str) -> PathBuf {
    target_dir.join(format!("{kind}.json"))
}

/// Directory holding every bucket of a per-identifier resource kind.
#[must_use]
pub fn identifier_root(target_dir: &Path, kind: &str) -> PathBuf {
    target_dir.join(kind)
}

/// Path of the JSON file holding one identifier of a per-identifier kind.
#[must_use]
pub fn identifier_path(target_dir: &Path, kind: &str, id: u64) -> PathBuf {
    identifier_root(target_dir, kind)
        .join(bucket_for(id).to_string())
        .join(format!("{id}.json"))
}

/// Directory that downloaded images are mirrored into.
#[must_use]
pub fn images_dir(target_dir: &Path) -> PathBuf {
    target_dir.join(IMAGES_SUBDIR)
}
