use thiserror::Error;

/// Result type for codec operations
pub type Base58Result<T> = Result<T, Base58Error>;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    #[error("invalid alphabet: base58 alphabets must be 58 bytes long, got {len}")]
    InvalidAlphabet { len: usize },

    #[error("invalid alphabet: symbols must be ASCII")]
    NonAsciiAlphabet,

    #[error("invalid base58 digit {character:?} at byte offset {position}")]
    InvalidDigit { character: char, position: usize },

    #[error("invalid encoded string: length must be greater than 0")]
    EmptyInput,

    #[error("decoded number does not fit the output width")]
    Overflow,
}
