use thiserror::Error;

/// A foreign generic signature or erased descriptor that does not parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unexpected end of signature '{signature}'")]
    UnexpectedEnd { signature: String },

    #[error("unexpected '{found}' at offset {pos} in signature '{signature}'")]
    UnexpectedChar {
        found: char,
        pos: usize,
        signature: String,
    },

    #[error("trailing input at offset {pos} in signature '{signature}'")]
    TrailingInput { pos: usize, signature: String },

    #[error("'{signature}' is not a valid identifier")]
    EmptyIdentifier { signature: String },
}

/// Failure to load a declaration fixture.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("cannot parse declaration fixture: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot read declaration fixture: {0}")]
    Io(#[from] std::io::Error),

    #[error("class '{0}' is declared twice")]
    DuplicateClass(String),
}
