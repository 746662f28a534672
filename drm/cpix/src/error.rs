use thiserror::Error;

/**
    Errors from rendering CPIX requests and parsing CPIX responses.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpixError {
    // ── Request templates ─────────────────────────────────────────────
    #[error("unterminated placeholder at byte {0}")]
    UnterminatedPlaceholder(usize),
    #[error("unknown placeholder {{{{{0}}}}}")]
    UnknownPlaceholder(String),

    // ── Response documents ────────────────────────────────────────────
    #[error("response is not valid UTF-8: {0}")]
    InvalidUtf8(String),
    #[error("invalid XML: {0}")]
    InvalidXml(String),
    #[error("root element is <{0}>, expected <CPIX>")]
    UnexpectedRoot(String),
    #[error("document has no root element")]
    MissingRoot,
    #[error("document ends inside <{0}>")]
    UnexpectedEof(String),
}

pub type CpixResult<T> = Result<T, CpixError>;
