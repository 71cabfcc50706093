use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Content of a file read into memory
#[derive(Debug, Clone)]
pub struct FileContent {
    /// Path to the file, as given by the caller
    pub path: String,
    /// File content as valid UTF-8 string
    pub content: String,
    /// BLAKE3 hash of the content (hex-encoded)
    pub checksum: String,
}

/// Error types for file operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid UTF-8 in file: {0}")]
    InvalidUtf8(String),
}

/// Hex-encoded BLAKE3 checksum of `content`
pub fn checksum(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

/// Read a file from disk with UTF-8 validation
///
/// # Returns
/// * `Ok(FileContent)` - File content with metadata
/// * `Err(FileError)` - File not found, I/O error, or invalid UTF-8
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<FileContent, FileError> {
    let path_ref = path.as_ref();
    let display = path_ref.display().to_string();

    if !path_ref.is_file() {
        return Err(FileError::NotFound(display));
    }

    let bytes = fs::read(path_ref).map_err(|source| FileError::Io {
        path: display.clone(),
        source,
    })?;

    let content = String::from_utf8(bytes).map_err(|_| FileError::InvalidUtf8(display.clone()))?;

    Ok(FileContent {
        checksum: checksum(&content),
        path: display,
        content,
    })
}

/// Overwrite a file with `content` in full
///
/// The write is a single synchronous call; no temporary file or rename is
/// involved, so the path keeps its inode and permissions.
pub fn write_file<P: AsRef<Path>>(path: P, content: &str) -> Result<(), FileError> {
    let path_ref = path.as_ref();
    fs::write(path_ref, content.as_bytes()).map_err(|source| FileError::Io {
        path: path_ref.display().to_string(),
        source,
    })
}
