#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("unsupported source: {0} (expected an http(s) URL, a directory of PDFs or a .txt file)")]
    UnsupportedSource(String),

    #[error("failed to load {descriptor}: {reason}")]
    Load { descriptor: String, reason: String },

    #[error("invalid splitter config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),
}

impl DocumentError {
    /// Wrap any failure while loading `descriptor` into a [`DocumentError::Load`].
    pub(crate) fn load(descriptor: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Load {
            descriptor: descriptor.into(),
            reason: reason.to_string(),
        }
    }
}
