//! Signing utilities for the WeChat Pay V3 API
//!
//! Every V3 request carries an `Authorization` header signed over the
//! method, URL, timestamp, nonce and body. Every response carries
//! `Wechatpay-*` headers that let the caller check it came from WeChat Pay.
//!
//! The signature primitive is pluggable:
//!
//! - [`RequestSigner`] signs outgoing requests
//! - [`ResponseVerifier`] checks response signatures
//! - [`SensitiveCipher`] encrypts/decrypts sensitive fields
//!
//! ## Security
//!
//! The merchant private key and API keys must never leave the server.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wechat_pay_smartguide::crypto::{HmacSha256Signer, RequestSigner};
//!
//! let signer = HmacSha256Signer::new("api_key")?;
//! let signature = signer.sign(b"GET\n/v3/smartguide/guides\n...")?;
//! ```

pub mod sign;

pub use sign::{
    build_request_message, build_response_message, format_authorization, generate_nonce,
    HmacSha256Signer, RequestSigner, ResponseVerifier, SensitiveCipher, AUTH_SCHEMA,
};
