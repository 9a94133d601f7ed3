//! Writing results to disk.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::session::{Session, TransformResult};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("no result to download")]
    NothingToDownload,
    #[error("{path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl DownloadError {
    fn io(path: &Path, err: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// `chronos-lens-30.png`, `chronos-lens--20.png`.
pub fn download_file_name(offset: i32) -> String {
    format!("chronos-lens-{offset}.png")
}

/// Writes one result into `dir`, creating the directory when missing.
pub fn write_result(dir: &Path, result: &TransformResult) -> Result<PathBuf, DownloadError> {
    std::fs::create_dir_all(dir).map_err(|e| DownloadError::io(dir, e))?;
    let path = dir.join(download_file_name(result.offset));
    std::fs::write(&path, result.image.data()).map_err(|e| DownloadError::io(&path, e))?;
    info!(
        domain = "download",
        event = "download.written",
        offset = result.offset,
        bytes = result.image.len(),
        path = %path.display(),
        "result written"
    );
    Ok(path)
}

/// Writes the focused result.
pub fn write_focused(dir: &Path, session: &Session) -> Result<PathBuf, DownloadError> {
    let result = session
        .focused_result()
        .ok_or(DownloadError::NothingToDownload)?;
    write_result(dir, result)
}

/// Writes every result, past to future.
pub fn write_all(dir: &Path, session: &Session) -> Result<Vec<PathBuf>, DownloadError> {
    if session.result_count() == 0 {
        return Err(DownloadError::NothingToDownload);
    }
    session
        .results()
        .map(|result| write_result(dir, result))
        .collect()
}
