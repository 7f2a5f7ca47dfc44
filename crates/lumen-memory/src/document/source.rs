//! Source descriptor classification, kept free of I/O beyond the injected probe.

use std::path::{Path, PathBuf};

use url::Url;

use super::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Url(Url),
    PdfDirectory(PathBuf),
    TextFile(PathBuf),
}

/// Filesystem queries needed to classify a descriptor.
pub trait FsProbe {
    fn is_dir(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
}

/// [`FsProbe`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl FsProbe for StdFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Classify a source descriptor.
///
/// Recognized forms, checked in order: `http://` or `https://` URL, existing
/// directory (all PDFs inside), existing file with a `.txt` extension.
///
/// # Errors
///
/// Returns [`DocumentError::UnsupportedSource`] for anything else, including
/// paths that do not exist.
pub fn classify(descriptor: &str, fs: &impl FsProbe) -> Result<SourceKind, DocumentError> {
    let trimmed = descriptor.trim();
    let unsupported = || DocumentError::UnsupportedSource(descriptor.to_owned());

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        let url = Url::parse(trimmed).map_err(|_| unsupported())?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(unsupported());
        }
        return Ok(SourceKind::Url(url));
    }

    if trimmed.is_empty() {
        return Err(unsupported());
    }

    let path = Path::new(trimmed);
    if fs.is_dir(path) {
        return Ok(SourceKind::PdfDirectory(path.to_path_buf()));
    }

    let is_txt = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"));
    if is_txt && fs.is_file(path) {
        return Ok(SourceKind::TextFile(path.to_path_buf()));
    }

    Err(unsupported())
}
