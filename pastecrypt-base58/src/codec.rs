//! Encoding and decoding between raw bytes and base58 text.

use crate::alphabet::{Alphabet, BITCOIN};
use crate::error::{Base58Error, Base58Result};

const BASE: u32 = 58;

/// Encode bytes as base58 text.
///
/// Each leading zero byte becomes one zero symbol; the remaining bytes are
/// converted as a big-endian integer. The output length depends on the
/// numeric value, not only on the input length. Empty input encodes to the
/// empty string.
pub fn encode(input: &[u8], alphabet: &Alphabet) -> String {
    let zeros = input.iter().take_while(|&&byte| byte == 0).count();
    let payload = &input[zeros..];

    // log58(256) < 1.38
    let capacity = (payload.len() * 138).div_ceil(100) + 1;

    // Least significant digit first
    let mut digits: Vec<u8> = Vec::with_capacity(capacity);
    for &byte in payload {
        let mut carry = u32::from(byte);
        for digit in digits.iter_mut() {
            carry += u32::from(*digit) << 8;
            *digit = (carry % BASE) as u8;
            carry /= BASE;
        }
        while carry > 0 {
            digits.push((carry % BASE) as u8);
            carry /= BASE;
        }
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }

    let mut output = String::with_capacity(zeros + digits.len());
    output.extend(std::iter::repeat(alphabet.zero() as char).take(zeros));
    output.extend(digits.iter().rev().map(|&digit| alphabet.symbol(digit) as char));
    output
}

/// Decode base58 text into bytes.
///
/// Every leading zero symbol becomes one leading zero byte, followed by the
/// minimal big-endian representation of the remaining value. A string made
/// only of zero symbols decodes to the same number of zero bytes.
///
/// # Errors
///
/// - [`Base58Error::EmptyInput`] for an empty string
/// - [`Base58Error::InvalidDigit`] for any character outside the alphabet
/// - [`Base58Error::Overflow`] if the accumulated value outgrows its words
pub fn decode(input: &str, alphabet: &Alphabet) -> Base58Result<Vec<u8>> {
    if input.is_empty() {
        return Err(Base58Error::EmptyInput);
    }

    let digits = input
        .char_indices()
        .map(|(position, character)| {
            alphabet
                .digit(character)
                .ok_or(Base58Error::InvalidDigit {
                    character,
                    position,
                })
        })
        .collect::<Base58Result<Vec<u8>>>()?;

    let zeros = digits.iter().take_while(|&&digit| digit == 0).count();

    // n digits never need more than n bytes; words[0] is the most
    // significant word and only holds the bytes left over after filling
    // whole words.
    let width = digits.len();
    let mut words = vec![0u32; width.div_ceil(4)];
    let partial = width % 4;
    let high_mask: u32 = if partial > 0 {
        u32::MAX << (partial * 8)
    } else {
        0
    };

    for &digit in &digits {
        let mut carry = u64::from(digit);
        for word in words.iter_mut().rev() {
            let product = u64::from(*word) * u64::from(BASE) + carry;
            carry = product >> 32;
            *word = product as u32;
        }

        if carry != 0 {
            return Err(Base58Error::Overflow);
        }
        if words[0] & high_mask != 0 {
            return Err(Base58Error::Overflow);
        }
    }

    let packed: Vec<u8> = words.iter().flat_map(|word| word.to_be_bytes()).collect();
    let significant = packed
        .iter()
        .position(|&byte| byte != 0)
        .unwrap_or(packed.len());

    let mut output = Vec::with_capacity(zeros + packed.len() - significant);
    output.resize(zeros, 0);
    output.extend_from_slice(&packed[significant..]);
    Ok(output)
}

/// Encode with the [`BITCOIN`] alphabet.
pub fn encode_bitcoin(input: &[u8]) -> String {
    encode(input, &BITCOIN)
}

/// Decode with the [`BITCOIN`] alphabet.
pub fn decode_bitcoin(input: &str) -> Base58Result<Vec<u8>> {
    decode(input, &BITCOIN)
}
