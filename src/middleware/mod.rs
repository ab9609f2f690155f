//! Middleware components for WeChat Pay SDK.
//!
//! Middleware wraps the transport using Tower patterns and can be attached
//! with [`WechatPayBuilder::with_middleware`](crate::client::WechatPayBuilder::with_middleware).
//! Requests reach the middleware already signed.
//!
//! ## Middleware Types
//!
//! - [`LoggingMiddleware`] - Logs request/response information with
//!   personal data redacted
//!
//! ## Usage
//!
//! ```ignore
//! use wechat_pay_smartguide::middleware::LoggingMiddleware;
//!
//! let wechat = WechatPay::builder()
//!     .mchid(mchid)
//!     .serial_no(serial_no)
//!     .signer(signer)
//!     .with_middleware(LoggingMiddleware::new().verbose())
//!     .build()?;
//! ```

// Re-export tower types for convenience
pub use tower::{Layer, Service, ServiceBuilder};

mod logging;

pub use logging::LoggingMiddleware;
