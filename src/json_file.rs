//! JSON snapshot helpers.
//!
//! Snapshots are written pretty-printed with a 4-space indent and non-ASCII
//! text left unescaped. Writes go to a sibling temporary file first and are
//! renamed into place, so an interrupted run never leaves a truncated snapshot
//! that skip-existing would later trust.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use thiserror::Error;
use tracing::debug;

/// Errors from reading or writing a JSON snapshot.
#[derive(Debug, Error)]
pub enum JsonFileError {
    /// File system error.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The data could not be serialized, or the file is not valid JSON.
    #[error("JSON error at {path}: {source}")]
    Serde {
        /// The file involved.
        path: PathBuf,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}

impl JsonFileError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn serde(path: &Path, source: serde_json::Error) -> Self {
        Self::Serde {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Writes `data` to `path` as indented JSON, creating parent directories.
///
/// # Errors
///
/// Returns [`JsonFileError`] if a directory or the file cannot be written, or
/// if `data` fails to serialize.
pub fn save_json_file<T: Serialize + ?Sized>(data: &T, path: &Path) -> Result<(), JsonFileError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| JsonFileError::io(parent, e))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let file = fs::File::create(&tmp_path).map_err(|e| JsonFileError::io(&tmp_path, e))?;
    let mut writer = BufWriter::new(file);
    let mut serializer =
        Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    data.serialize(&mut serializer)
        .map_err(|e| JsonFileError::serde(path, e))?;
    writer
        .flush()
        .map_err(|e| JsonFileError::io(&tmp_path, e))?;
    drop(writer);

    fs::rename(&tmp_path, path).map_err(|e| JsonFileError::io(path, e))?;
    debug!(path = %path.display(), "saved JSON snapshot");
    Ok(())
}

/// Reads a JSON snapshot back from disk.
///
/// # Errors
///
/// Returns [`JsonFileError`] if the file cannot be read or is not valid JSON.
pub fn load_json_file(path: &Path) -> Result<Value, JsonFileError> {
    let text = fs::read_to_string(path).map_err(|e| JsonFileError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| JsonFileError::serde(path, e))
}
