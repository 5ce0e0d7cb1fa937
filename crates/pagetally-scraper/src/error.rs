use thiserror::Error;

/// Shown to the user whenever the page cannot be reached at all.
pub const PAGE_UNAVAILABLE_MESSAGE: &str =
    "Could not connect to page. Please reload and try again.";

#[derive(Debug, Error)]
pub enum ScraperError {
    /// An element the extractor depends on is absent from the page.
    #[error("no {what} found on page")]
    StructuralNotFound { what: String },

    /// One record's text did not have the expected shape.
    #[error("could not parse {context}: {reason}")]
    ParseFailure { context: String, reason: String },

    /// The page could not be produced (not loaded, closed, missing snapshot).
    #[error("page unavailable: {reason}")]
    PageUnavailable { reason: String },

    #[error("click on \"{label}\" failed: {reason}")]
    ClickFailed { label: String, reason: String },

    #[error("invalid CSS selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScraperError {
    /// Text suitable for a `{success:false, message}` reply.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::PageUnavailable { .. } => PAGE_UNAVAILABLE_MESSAGE.to_string(),
            Self::StructuralNotFound { what } => format!("No {what} found"),
            other => other.to_string(),
        }
    }
}
