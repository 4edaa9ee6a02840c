//! Key material and authenticated encryption for pastes.
//!
//! Uses:
//! - PBKDF2-HMAC-SHA256 to stretch the master key
//! - AES-256-GCM for authenticated encryption
//!
//! The associated data is the JSON array
//! `[[iv, salt, iterations, keySize, tagSize, "aes", "gcm", "none"], formatter, openDiscussion, burnAfterReading]`.
//! Readers of the paste rebuild it from the request's `adata` field, so the
//! element order is part of the format.

use std::fmt;

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine};
use pastecrypt_base58::encode_bitcoin;
use pbkdf2::pbkdf2_hmac;
use rand::{CryptoRng, RngCore};
use serde::ser::{Serialize, SerializeTuple, Serializer};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use super::protocol::PasteOptions;
use super::{PasteError, PasteResult};

/// Size of the master key in bytes.
pub const MASTER_KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes.
pub const IV_SIZE: usize = 12;

/// Size of the PBKDF2 salt in bytes.
pub const SALT_SIZE: usize = 8;

pub const KDF_ITERATIONS: u32 = 100_000;
pub const KEY_SIZE_BITS: u32 = 256;
pub const TAG_SIZE_BITS: u32 = 128;

pub const ALGORITHM: &str = "aes";
pub const MODE: &str = "gcm";
pub const COMPRESSION: &str = "none";

/// The random secret a paste is encrypted under.
///
/// Only its base58 form in the share URL fragment ever leaves the process.
/// The bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; MASTER_KEY_SIZE],
}

impl MasterKey {
    /// Generate a new master key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> PasteResult<Self> {
        let mut key = Self {
            bytes: [0u8; MASTER_KEY_SIZE],
        };
        rng.try_fill_bytes(&mut key.bytes)?;
        Ok(key)
    }

    /// Get the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; MASTER_KEY_SIZE] {
        &self.bytes
    }

    /// Base58 (bitcoin alphabet) form used as the share URL fragment.
    pub fn to_fragment(&self) -> String {
        encode_bitcoin(&self.bytes)
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}

/// Public parameters of one encryption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionSpec {
    pub iv: [u8; IV_SIZE],
    pub salt: [u8; SALT_SIZE],
    pub iterations: u32,
    pub key_size: u32,
    pub tag_size: u32,
    pub algorithm: &'static str,
    pub mode: &'static str,
    pub compression: &'static str,
}

impl EncryptionSpec {
    /// Fresh IV and salt with the fixed protocol parameters.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> PasteResult<Self> {
        let mut iv = [0u8; IV_SIZE];
        rng.try_fill_bytes(&mut iv)?;
        let mut salt = [0u8; SALT_SIZE];
        rng.try_fill_bytes(&mut salt)?;

        Ok(Self {
            iv,
            salt,
            iterations: KDF_ITERATIONS,
            key_size: KEY_SIZE_BITS,
            tag_size: TAG_SIZE_BITS,
            algorithm: ALGORITHM,
            mode: MODE,
            compression: COMPRESSION,
        })
    }
}

impl Serialize for EncryptionSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_tuple(8)?;
        seq.serialize_element(&BASE64.encode(self.iv))?;
        seq.serialize_element(&BASE64.encode(self.salt))?;
        seq.serialize_element(&self.iterations)?;
        seq.serialize_element(&self.key_size)?;
        seq.serialize_element(&self.tag_size)?;
        seq.serialize_element(self.algorithm)?;
        seq.serialize_element(self.mode)?;
        seq.serialize_element(self.compression)?;
        seq.end()
    }
}

/// Data authenticated alongside the ciphertext and sent as `adata`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedData {
    pub spec: EncryptionSpec,
    pub formatter: String,
    pub open_discussion: bool,
    pub burn_after_reading: bool,
}

impl AuthenticatedData {
    /// Compact JSON serialization, used verbatim as the AEAD associated data.
    pub fn to_bytes(&self) -> PasteResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

impl Serialize for AuthenticatedData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_tuple(4)?;
        seq.serialize_element(&self.spec)?;
        seq.serialize_element(&self.formatter)?;
        // flags travel as 0/1, not JSON booleans
        seq.serialize_element(&u8::from(self.open_discussion))?;
        seq.serialize_element(&u8::from(self.burn_after_reading))?;
        seq.end()
    }
}

/// A sealed paste: authenticated data plus ciphertext with its 16-byte tag.
#[derive(Debug, Clone)]
pub struct PasteEnvelope {
    pub adata: AuthenticatedData,
    pub ciphertext: Vec<u8>,
}

/// Encrypt a plaintext under a master key.
///
/// The IV and salt are drawn from `rng`; the `CryptoRng` bound keeps
/// non-cryptographic generators out.
pub fn seal<R: RngCore + CryptoRng>(
    rng: &mut R,
    master_key: &MasterKey,
    plaintext: &[u8],
    options: &PasteOptions,
) -> PasteResult<PasteEnvelope> {
    let adata = AuthenticatedData {
        spec: EncryptionSpec::generate(rng)?,
        formatter: options.formatter.clone(),
        open_discussion: options.open_discussion,
        burn_after_reading: options.burn_after_reading,
    };
    let aad = adata.to_bytes()?;

    let cipher = derive_cipher(master_key, &adata.spec)?;
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&adata.spec.iv),
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| PasteError::Encryption("AES-GCM sealing failed".to_string()))?;

    Ok(PasteEnvelope { adata, ciphertext })
}

/// Derive the AES-256-GCM cipher for a master key and spec.
pub(crate) fn derive_cipher(master_key: &MasterKey, spec: &EncryptionSpec) -> PasteResult<Aes256Gcm> {
    let mut key = Zeroizing::new([0u8; (KEY_SIZE_BITS / 8) as usize]);
    pbkdf2_hmac::<Sha256>(master_key.as_bytes(), &spec.salt, spec.iterations, &mut key[..]);
    Aes256Gcm::new_from_slice(&key[..])
        .map_err(|_| PasteError::Encryption("invalid AES-256 key length".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::{OsRng, StdRng};
    use rand::SeedableRng;

    fn options() -> PasteOptions {
        PasteOptions {
            expire: "5min".to_string(),
            formatter: "plaintext".to_string(),
            open_discussion: false,
            burn_after_reading: true,
        }
    }

    fn open(master_key: &MasterKey, spec: &EncryptionSpec, aad: &[u8], ciphertext: &[u8]) -> Option<Vec<u8>> {
        derive_cipher(master_key, spec)
            .unwrap()
            .decrypt(
                Nonce::from_slice(&spec.iv),
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .ok()
    }

    /// Generator that never has entropy available.
    struct ExhaustedRng;

    impl RngCore for ExhaustedRng {
        fn next_u32(&mut self) -> u32 {
            0
        }
        fn next_u64(&mut self) -> u64 {
            0
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }
        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source exhausted"))
        }
    }

    impl CryptoRng for ExhaustedRng {}

    #[test]
    fn test_master_key_generation() {
        let k1 = MasterKey::generate(&mut OsRng).unwrap();
        let k2 = MasterKey::generate(&mut OsRng).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());

        let fragment = k1.to_fragment();
        assert_eq!(
            pastecrypt_base58::decode_bitcoin(&fragment).unwrap(),
            k1.as_bytes().to_vec()
        );
    }

    #[test]
    fn test_master_key_debug_is_redacted() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let debug = format!("{:?}", key);
        assert_eq!(debug, "MasterKey([REDACTED])");
        assert!(!debug.contains(&key.to_fragment()));
    }

    #[test]
    fn test_random_source_failure_propagates() {
        assert!(matches!(
            MasterKey::generate(&mut ExhaustedRng),
            Err(PasteError::RandomSource(_))
        ));

        let key = MasterKey::generate(&mut OsRng).unwrap();
        assert!(matches!(
            seal(&mut ExhaustedRng, &key, b"{}", &options()),
            Err(PasteError::RandomSource(_))
        ));
    }

    #[test]
    fn test_authenticated_data_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let spec = EncryptionSpec::generate(&mut rng).unwrap();
        let adata = AuthenticatedData {
            spec: spec.clone(),
            formatter: "plaintext".to_string(),
            open_discussion: false,
            burn_after_reading: true,
        };

        let json = String::from_utf8(adata.to_bytes().unwrap()).unwrap();
        let expected = format!(
            r#"[["{}","{}",100000,256,128,"aes","gcm","none"],"plaintext",0,1]"#,
            BASE64.encode(spec.iv),
            BASE64.encode(spec.salt)
        );
        assert_eq!(json, expected);

        // unpadded base64: 12 bytes -> 16 chars, 8 bytes -> 11 chars
        assert!(!json.contains('='));
        assert_eq!(BASE64.encode(spec.iv).len(), 16);
        assert_eq!(BASE64.encode(spec.salt).len(), 11);
    }

    #[test]
    fn test_seal_and_open() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let plaintext = br#"{"paste":"hello"}"#;
        let envelope = seal(&mut OsRng, &key, plaintext, &options()).unwrap();

        // ciphertext carries the 16-byte tag
        assert_eq!(envelope.ciphertext.len(), plaintext.len() + 16);

        let aad = envelope.adata.to_bytes().unwrap();
        let opened = open(&key, &envelope.adata.spec, &aad, &envelope.ciphertext).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_fresh_parameters_per_seal() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let a = seal(&mut OsRng, &key, b"same", &options()).unwrap();
        let b = seal(&mut OsRng, &key, b"same", &options()).unwrap();

        assert_ne!(a.adata.spec.iv, b.adata.spec.iv);
        assert_ne!(a.adata.spec.salt, b.adata.spec.salt);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_reordered_authenticated_data_fails() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let envelope = seal(&mut OsRng, &key, b"secret", &options()).unwrap();
        let spec = &envelope.adata.spec;

        let reordered = serde_json::to_vec(&serde_json::json!([
            "plaintext",
            [
                BASE64.encode(spec.iv),
                BASE64.encode(spec.salt),
                100000,
                256,
                128,
                "aes",
                "gcm",
                "none"
            ],
            0,
            1
        ]))
        .unwrap();
        assert!(open(&key, spec, &reordered, &envelope.ciphertext).is_none());

        let swapped_spec = serde_json::to_vec(&serde_json::json!([
            [
                BASE64.encode(spec.salt),
                BASE64.encode(spec.iv),
                100000,
                256,
                128,
                "aes",
                "gcm",
                "none"
            ],
            "plaintext",
            0,
            1
        ]))
        .unwrap();
        assert!(open(&key, spec, &swapped_spec, &envelope.ciphertext).is_none());
    }

    #[test]
    fn test_flipped_flag_fails() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let envelope = seal(&mut OsRng, &key, b"secret", &options()).unwrap();

        let mut tampered = envelope.adata.clone();
        tampered.burn_after_reading = false;
        let aad = tampered.to_bytes().unwrap();
        assert!(open(&key, &envelope.adata.spec, &aad, &envelope.ciphertext).is_none());
    }

    #[test]
    fn test_wrong_master_key_fails() {
        let key = MasterKey::generate(&mut OsRng).unwrap();
        let other = MasterKey::generate(&mut OsRng).unwrap();
        let envelope = seal(&mut OsRng, &key, b"secret", &options()).unwrap();

        let aad = envelope.adata.to_bytes().unwrap();
        assert!(open(&other, &envelope.adata.spec, &aad, &envelope.ciphertext).is_none());
    }
}
