//! WeChat Pay V3 API modules
//!
//! - [`smartguide`] - Smart Guide (service staff) registration, assignment,
//!   query and update
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wechat_pay_smartguide::api::{PayContext, SmartGuideApi};
//!
//! let api = SmartGuideApi::new(Arc::new(PayContext::new(Arc::new(client))));
//! let guides = api.query(&params).await?;
//! ```

pub mod smartguide;
pub mod r#trait;

pub use r#trait::{PayContext, WechatPayApi};
pub use smartguide::{
    AssignGuideRequest, GuideItem, SmartGuideApi, SmartGuideQuery, SmartGuideReg,
};
