//! WeChat Pay V3 Smart Guide SDK for Rust
//!
//! Client for the WeChat Pay "Smart Guide" (service staff) endpoints:
//! registering in-store guides, assigning them to orders, querying and
//! updating them.
//!
//! ## API Coverage
//!
//! | Operation | Method | Path | Success |
//! |-----------|--------|------|---------|
//! | Register | POST | `/v3/smartguide/guides` | 200 |
//! | Assign | POST | `/v3/smartguide/guides/{guide_id}/assign` | 204 |
//! | Query | GET | `/v3/smartguide/guides` | 200 |
//! | Update | PATCH | `/v3/smartguide/guides/{guide_id}` | 204 |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wechat_pay_smartguide::{WechatPay, types::{BodyMap, MchId, SerialNo}};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let wechat = WechatPay::builder()
//!         .mchid(MchId::new("1900000109")?)
//!         .serial_no(SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1")?)
//!         .signer(Arc::new(my_rsa_signer))
//!         .verifier(Arc::new(my_platform_verifier))
//!         .build()?;
//!
//!     let mut guide = BodyMap::new();
//!     guide
//!         .set("corpid", "1234567890")
//!         .set("store_id", 1234)
//!         .set("userid", "robert")
//!         .set("name", wechat.v3_encrypt_text("robert")?)
//!         .set("mobile", wechat.v3_encrypt_text("13800138000")?);
//!
//!     let resp = wechat.smart_guide_register(&guide).await?;
//!     if resp.is_success() {
//!         println!("guide id: {}", resp.response.unwrap().guide_id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - WeChat Pay API modules (smart guide)
//! - [`client`] - Signing HTTP client and the [`WechatPay`] facade
//! - [`crypto`] - Request signing and response verification
//! - [`error`] - Error types
//! - [`middleware`] - Tower middleware for the transport
//! - [`types`] - Parameter map, response envelope and identifiers
//!
//! ## Error Handling
//!
//! Transport, signing and decode failures are returned as [`WechatPayError`].
//! A non-success HTTP status is *not* an error: it is reported in the
//! envelope's `code`/`error` fields. A failed response signature check is
//! reported alongside the envelope:
//!
//! ```rust,ignore
//! match wechat.smart_guide_assign(guide_id, out_trade_no).await {
//!     Ok(resp) if resp.verify_result().is_err() => { /* untrusted reply */ }
//!     Ok(resp) if resp.is_success() => { /* assigned */ }
//!     Ok(resp) => eprintln!("HTTP {}: {}", resp.code, resp.error),
//!     Err(WechatPayError::MissingParam(field)) => eprintln!("missing {}", field),
//!     Err(e) => eprintln!("call failed: {}", e),
//! }
//! ```

pub mod api;
pub mod client;
pub mod crypto;
pub mod error;
pub mod middleware;
pub mod types;

pub use client::{PayClient, PayClientBuilder, WechatPay, WechatPayBuilder};
pub use error::WechatPayError;
