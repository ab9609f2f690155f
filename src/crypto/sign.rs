//! WeChat Pay V3 request signing and response signature verification

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::Sha256;

use crate::error::WechatPayError;

type HmacSha256 = Hmac<Sha256>;

/// Authorization schema of the V3 API
pub const AUTH_SCHEMA: &str = "WECHATPAY2-SHA256-RSA2048";

const NONCE_LEN: usize = 32;

/// Produces the `signature` part of the `Authorization` header.
///
/// Merchants holding an RSA API certificate implement this over their
/// private key. [`HmacSha256Signer`] is provided for symmetric setups.
pub trait RequestSigner: Send + Sync {
    /// Sign `message` and return the base64 signature.
    fn sign(&self, message: &[u8]) -> Result<String, WechatPayError>;

    /// Schema prefix of the `Authorization` header.
    fn schema(&self) -> &str {
        AUTH_SCHEMA
    }
}

/// Checks the `Wechatpay-Signature` of a response against the platform key
/// identified by `serial`.
pub trait ResponseVerifier: Send + Sync {
    fn verify(&self, serial: &str, message: &[u8], signature: &str)
        -> Result<(), WechatPayError>;
}

/// Encrypts request fields and decrypts response fields marked sensitive
/// (names, mobile numbers).
pub trait SensitiveCipher: Send + Sync {
    fn encrypt_text(&self, plain: &str) -> Result<String, WechatPayError>;

    fn decrypt_text(&self, cipher: &str) -> Result<String, WechatPayError>;
}

/// HMAC-SHA256 signer and verifier over a shared key.
#[derive(Clone)]
pub struct HmacSha256Signer {
    key: Vec<u8>,
}

impl std::fmt::Debug for HmacSha256Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSha256Signer").finish_non_exhaustive()
    }
}

impl HmacSha256Signer {
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self, WechatPayError> {
        let key = key.into();
        if key.is_empty() {
            return Err(WechatPayError::Config("signing key must not be empty".to_string()));
        }
        Ok(Self { key })
    }

    fn mac(&self) -> Result<HmacSha256, WechatPayError> {
        HmacSha256::new_from_slice(&self.key)
            .map_err(|e| WechatPayError::Crypto(format!("Invalid HMAC key: {}", e)))
    }
}

impl RequestSigner for HmacSha256Signer {
    fn sign(&self, message: &[u8]) -> Result<String, WechatPayError> {
        let mut mac = self.mac()?;
        mac.update(message);
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }
}

impl ResponseVerifier for HmacSha256Signer {
    fn verify(
        &self,
        _serial: &str,
        message: &[u8],
        signature: &str,
    ) -> Result<(), WechatPayError> {
        let expected = BASE64
            .decode(signature)
            .map_err(|e| WechatPayError::Signature(format!("Invalid signature encoding: {}", e)))?;
        let mut mac = self.mac()?;
        mac.update(message);
        mac.verify_slice(&expected)
            .map_err(|_| WechatPayError::Signature("signature mismatch".to_string()))
    }
}

/// Random alphanumeric nonce for `nonce_str`
pub fn generate_nonce() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Message signed for a request:
/// `METHOD\nURL\nTIMESTAMP\nNONCE\nBODY\n`
pub fn build_request_message(
    method: &str,
    url: &str,
    timestamp: i64,
    nonce: &str,
    body: &str,
) -> String {
    format!("{method}\n{url}\n{timestamp}\n{nonce}\n{body}\n")
}

/// Message covered by a response signature:
/// `TIMESTAMP\nNONCE\nBODY\n`
pub fn build_response_message(timestamp: &str, nonce: &str, body: &str) -> String {
    format!("{timestamp}\n{nonce}\n{body}\n")
}

/// Render the `Authorization` header value.
pub fn format_authorization(
    schema: &str,
    mchid: &str,
    nonce: &str,
    timestamp: i64,
    serial_no: &str,
    signature: &str,
) -> String {
    format!(
        r#"{schema} mchid="{mchid}",nonce_str="{nonce}",timestamp="{timestamp}",serial_no="{serial_no}",signature="{signature}""#
    )
}
