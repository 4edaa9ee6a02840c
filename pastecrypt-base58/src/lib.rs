//! # pastecrypt-base58
//!
//! Big-integer base58 codec over interchangeable 58-symbol alphabets.
//!
//! Input bytes are read as one big-endian unsigned integer and rewritten in
//! base 58. Every leading zero byte maps to one leading zero symbol (the
//! symbol at index 0 of the alphabet) and back, so the encoding is lossless
//! for any non-empty byte string.
//!
//! Two alphabets ship as process-wide constants:
//!
//! | Alphabet  | Symbols                                                      |
//! |-----------|--------------------------------------------------------------|
//! | [`BITCOIN`] | `123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz` |
//! | [`FLICKR`]  | `123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ` |
//!
//! ```
//! use pastecrypt_base58::{decode, encode, BITCOIN};
//!
//! let text = encode(&[0, 0, 0, 1], &BITCOIN);
//! assert_eq!(text, "1112");
//! assert_eq!(decode(&text, &BITCOIN).unwrap(), vec![0, 0, 0, 1]);
//! ```

pub mod alphabet;
pub mod codec;
pub mod error;

pub use alphabet::{Alphabet, ALPHABET_LEN, BITCOIN, FLICKR};
pub use codec::{decode, decode_bitcoin, encode, encode_bitcoin};
pub use error::{Base58Error, Base58Result};
