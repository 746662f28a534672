use thiserror::Error;

/**
    Errors from key ID normalization.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyIdError {
    #[error("parsing {value:?} into a uuid: {reason}")]
    InvalidUuid { value: String, reason: String },

    #[error("invalid base64 key ID {value:?}: {reason}")]
    InvalidBase64 { value: String, reason: String },

    #[error("key ID decodes to {0} bytes, expected 16")]
    InvalidLength(usize),
}

/**
    Errors from rewriting PSSH payloads for the packager.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsshError {
    #[error("invalid base64 in {system} PSSH: {reason}")]
    InvalidBase64 { system: &'static str, reason: String },

    #[error("{system} PSSH is {len} bytes, shorter than its {envelope}-byte envelope")]
    TooShort {
        system: &'static str,
        len: usize,
        envelope: usize,
    },
}

/**
    Error returned by `FromStr` implementations on enum types.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}
