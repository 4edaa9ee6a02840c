//! 58-symbol alphabets with their inverse lookup tables.

use std::fmt;

use crate::error::{Base58Error, Base58Result};

/// Number of symbols in every alphabet.
pub const ALPHABET_LEN: usize = 58;

/// Inverse-table entry for code points that are not digits.
const NOT_A_DIGIT: i8 = -1;

/// Bitcoin ordering: digits, upper case, lower case.
pub static BITCOIN: Alphabet =
    Alphabet::from_bytes(b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz");

/// Flickr ordering: digits, lower case, upper case.
pub static FLICKR: Alphabet =
    Alphabet::from_bytes(b"123456789abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ");

/// An ordered set of 58 ASCII symbols.
///
/// `encode` maps a digit value to its symbol; `decode` maps each of the 128
/// ASCII code points to its digit value, or [`NOT_A_DIGIT`].
///
/// A symbol listed twice is accepted: the later position wins in the
/// inverse table, so the earlier digit value can be encoded but never
/// decoded back.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    encode: [u8; ALPHABET_LEN],
    decode: [i8; 128],
}

impl Alphabet {
    /// Build an alphabet in const context.
    ///
    /// Panics (at compile time for statics) if a symbol is not ASCII.
    pub const fn from_bytes(symbols: &[u8; ALPHABET_LEN]) -> Self {
        let mut decode = [NOT_A_DIGIT; 128];
        let mut i = 0;
        while i < ALPHABET_LEN {
            let symbol = symbols[i];
            assert!(symbol < 128, "base58 alphabet symbols must be ASCII");
            decode[symbol as usize] = i as i8;
            i += 1;
        }
        Self {
            encode: *symbols,
            decode,
        }
    }

    /// Build an alphabet from a runtime string.
    ///
    /// # Errors
    ///
    /// [`Base58Error::InvalidAlphabet`] unless the string is exactly 58 bytes,
    /// [`Base58Error::NonAsciiAlphabet`] if any symbol is outside ASCII.
    pub fn new(symbols: &str) -> Base58Result<Self> {
        let bytes = symbols.as_bytes();
        let table: &[u8; ALPHABET_LEN] = bytes
            .try_into()
            .map_err(|_| Base58Error::InvalidAlphabet { len: bytes.len() })?;
        if !symbols.is_ascii() {
            return Err(Base58Error::NonAsciiAlphabet);
        }
        Ok(Self::from_bytes(table))
    }

    /// The symbols in digit order.
    pub fn symbols(&self) -> &[u8; ALPHABET_LEN] {
        &self.encode
    }

    /// The symbol for digit value zero.
    pub fn zero(&self) -> u8 {
        self.encode[0]
    }

    /// The symbol for a digit value in `0..58`.
    pub(crate) fn symbol(&self, digit: u8) -> u8 {
        self.encode[usize::from(digit)]
    }

    /// Digit value of a character, `None` if it is not part of the alphabet.
    pub fn digit(&self, character: char) -> Option<u8> {
        let code = u32::from(character);
        if code >= 128 {
            return None;
        }
        match self.decode[code as usize] {
            NOT_A_DIGIT => None,
            value => Some(value as u8),
        }
    }

    /// Encode bytes with this alphabet.
    pub fn encode(&self, input: &[u8]) -> String {
        crate::codec::encode(input, self)
    }

    /// Decode a string written in this alphabet.
    pub fn decode(&self, input: &str) -> Base58Result<Vec<u8>> {
        crate::codec::decode(input, self)
    }
}

impl fmt::Debug for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Alphabet")
            .field(&String::from_utf8_lossy(&self.encode))
            .finish()
    }
}
