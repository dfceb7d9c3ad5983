use std::fs;
use std::path::{Path, PathBuf};

use crate::editing::Document;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("File is not valid UTF-8: {0}")]
    InvalidEncoding(PathBuf),
}

/// Read a text file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::InvalidData => IoError::InvalidEncoding(path.to_path_buf()),
        _ => IoError::Io(err),
    })
}

/// Write content to a text file, creating parent directories
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Load a file into a [`Document`] named after the file
pub fn open_document(path: &Path) -> Result<Document, IoError> {
    let content = read_file(path)?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let doc = Document::from_bytes(content.as_bytes())
        .map_err(|_| IoError::InvalidEncoding(path.to_path_buf()))?;
    Ok(doc.with_name(name))
}

/// Write a document back to disk
pub fn save_document(path: &Path, doc: &Document) -> Result<(), IoError> {
    write_file(path, &doc.text())
}
