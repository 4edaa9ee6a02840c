//! Wire types of the PrivateBin version 2 API.

use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine};
use serde::{Deserialize, Serialize};

use super::crypto::{AuthenticatedData, PasteEnvelope};

/// Value of the request's `v` field.
pub const PROTOCOL_VERSION: u8 = 2;

/// Plaintext document that gets encrypted.
#[derive(Debug, Serialize)]
pub struct PasteContent<'a> {
    pub paste: &'a str,
}

/// Per-paste settings chosen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteOptions {
    /// Expiry tag understood by the service, e.g. `5min`, `1day`, `never`
    pub expire: String,
    /// Display formatter, e.g. `plaintext`, `syntaxhighlighting`, `markdown`
    pub formatter: String,
    pub open_discussion: bool,
    pub burn_after_reading: bool,
}

impl Default for PasteOptions {
    fn default() -> Self {
        Self {
            expire: "5min".to_string(),
            formatter: "plaintext".to_string(),
            open_discussion: false,
            burn_after_reading: true,
        }
    }
}

/// Request body for paste creation.
#[derive(Debug, Serialize)]
pub struct PasteRequest {
    pub v: u8,
    pub adata: AuthenticatedData,
    pub meta: PasteMeta,
    /// Ciphertext and tag, unpadded base64
    pub ct: String,
}

#[derive(Debug, Serialize)]
pub struct PasteMeta {
    pub expire: String,
}

impl PasteRequest {
    pub fn new(envelope: PasteEnvelope, expire: &str) -> Self {
        Self {
            v: PROTOCOL_VERSION,
            ct: BASE64.encode(&envelope.ciphertext),
            adata: envelope.adata,
            meta: PasteMeta {
                expire: expire.to_string(),
            },
        }
    }
}

/// Response from the paste service.
///
/// Failure responses only carry `status` and `message`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteResponse {
    pub id: String,
    /// 0 on success
    pub status: i64,
    pub message: String,
    pub url: String,
    #[serde(rename = "deletetoken")]
    pub delete_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paste::crypto::EncryptionSpec;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_request_serialization() {
        let mut rng = StdRng::seed_from_u64(1);
        let envelope = PasteEnvelope {
            adata: AuthenticatedData {
                spec: EncryptionSpec::generate(&mut rng).unwrap(),
                formatter: "markdown".to_string(),
                open_discussion: true,
                burn_after_reading: false,
            },
            ciphertext: vec![0xfb, 0xff, 0x00, 0x01],
        };
        let request = PasteRequest::new(envelope, "1day");

        let value: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["v"], 2);
        assert_eq!(value["meta"]["expire"], "1day");
        assert_eq!(value["ct"], "+/8AAQ");
        assert_eq!(value["adata"][0][2], 100000);
        assert_eq!(value["adata"][0][5], "aes");
        assert_eq!(value["adata"][0][6], "gcm");
        assert_eq!(value["adata"][0][7], "none");
        assert_eq!(value["adata"][1], "markdown");
        assert_eq!(value["adata"][2], 1);
        assert_eq!(value["adata"][3], 0);
    }

    #[test]
    fn test_adata_in_request_matches_associated_data() {
        let mut rng = StdRng::seed_from_u64(2);
        let adata = AuthenticatedData {
            spec: EncryptionSpec::generate(&mut rng).unwrap(),
            formatter: "plaintext".to_string(),
            open_discussion: false,
            burn_after_reading: true,
        };
        let aad = adata.to_bytes().unwrap();
        let request = PasteRequest::new(
            PasteEnvelope {
                adata,
                ciphertext: vec![1, 2, 3],
            },
            "5min",
        );

        // a reader re-serializes the generic adata value
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(serde_json::to_vec(&value["adata"]).unwrap(), aad);
    }

    #[test]
    fn test_content_serialization() {
        let json = serde_json::to_string(&PasteContent { paste: "hello" }).unwrap();
        assert_eq!(json, r#"{"paste":"hello"}"#);
    }

    #[test]
    fn test_success_response_parsing() {
        let body = r#"{"status":0,"id":"f468483c313401e8","url":"/?f468483c313401e8","deletetoken":"94d7cb24f1fb5a14"}"#;
        let response: PasteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, 0);
        assert_eq!(response.id, "f468483c313401e8");
        assert_eq!(response.url, "/?f468483c313401e8");
        assert_eq!(response.delete_token, "94d7cb24f1fb5a14");
        assert!(response.message.is_empty());
    }

    #[test]
    fn test_failure_response_parsing() {
        let body = r#"{"status":1,"message":"Invalid data."}"#;
        let response: PasteResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.status, 1);
        assert_eq!(response.message, "Invalid data.");
        assert!(response.id.is_empty());
    }

    #[test]
    fn test_default_options() {
        let options = PasteOptions::default();
        assert_eq!(options.expire, "5min");
        assert_eq!(options.formatter, "plaintext");
        assert!(!options.open_discussion);
        assert!(options.burn_after_reading);
    }
}
