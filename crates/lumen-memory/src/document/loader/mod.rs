#[cfg(feature = "pdf")]
mod pdf;
mod text;
mod web;

use std::path::{Path, PathBuf};

#[cfg(feature = "pdf")]
pub use pdf::PdfLoader;
pub use text::TextLoader;
pub use web::{DEFAULT_MAX_BODY_BYTES, WebLoader};

use super::source::{SourceKind, StdFs, classify};
use super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader};

/// Loads documents from a mixed list of source descriptors.
///
/// Every descriptor is classified before any I/O starts, so an unsupported
/// descriptor fails the whole call up front. With `fail_fast` off, a source
/// that fails to load is logged and skipped.
pub struct SourceLoader {
    web: WebLoader,
    text: TextLoader,
    #[cfg(feature = "pdf")]
    pdf: PdfLoader,
    fail_fast: bool,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl SourceLoader {
    #[must_use]
    pub fn new(max_file_size: u64) -> Self {
        Self {
            web: WebLoader::default(),
            text: TextLoader { max_file_size },
            #[cfg(feature = "pdf")]
            pdf: PdfLoader { max_file_size },
            fail_fast: true,
        }
    }

    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    #[must_use]
    pub fn with_web_loader(mut self, web: WebLoader) -> Self {
        self.web = web;
        self
    }

    /// Load all `sources` in order.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedSource`] if any descriptor is not
    /// recognized, or [`DocumentError::Load`] for the first failing source when
    /// `fail_fast` is set.
    pub async fn load<S: AsRef<str>>(&self, sources: &[S]) -> Result<Vec<Document>, DocumentError> {
        let classified = sources
            .iter()
            .map(|s| classify(s.as_ref(), &StdFs).map(|kind| (s.as_ref(), kind)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut documents = Vec::new();
        for (descriptor, kind) in classified {
            match self.load_one(descriptor, kind).await {
                Ok(docs) => {
                    tracing::info!(source = descriptor, documents = docs.len(), "loaded source");
                    documents.extend(docs);
                }
                Err(e) if self.fail_fast => return Err(e),
                Err(e) => tracing::warn!("skipping source: {e}"),
            }
        }
        Ok(documents)
    }

    async fn load_one(
        &self,
        descriptor: &str,
        kind: SourceKind,
    ) -> Result<Vec<Document>, DocumentError> {
        match kind {
            SourceKind::Url(url) => Ok(vec![self.web.load(&url).await?]),
            SourceKind::TextFile(path) => self
                .text
                .load(&path)
                .await
                .map_err(|e| DocumentError::load(descriptor, e)),
            SourceKind::PdfDirectory(dir) => self.load_pdf_dir(descriptor, &dir).await,
        }
    }

    #[cfg(feature = "pdf")]
    async fn load_pdf_dir(
        &self,
        descriptor: &str,
        dir: &Path,
    ) -> Result<Vec<Document>, DocumentError> {
        let files = list_with_extension(dir, self.pdf.supported_extensions())
            .await
            .map_err(|e| DocumentError::load(descriptor, e))?;
        if files.is_empty() {
            tracing::warn!(dir = descriptor, "no PDF files found in directory");
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let docs = self
                .pdf
                .load(&file)
                .await
                .map_err(|e| DocumentError::load(file.display().to_string(), e))?;
            documents.extend(docs);
        }
        Ok(documents)
    }

    #[cfg(not(feature = "pdf"))]
    #[allow(clippy::unused_async)]
    async fn load_pdf_dir(
        &self,
        descriptor: &str,
        _dir: &Path,
    ) -> Result<Vec<Document>, DocumentError> {
        Err(DocumentError::load(
            descriptor,
            "PDF support is disabled (build with the `pdf` feature)",
        ))
    }
}

/// Regular files directly inside `dir` whose extension matches, sorted by path.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
async fn list_with_extension(dir: &Path, extensions: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
        if matches && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
