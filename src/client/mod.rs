//! WeChat Pay HTTP Client module
//!
//! This module contains the PayClient and the WechatPay facade.

mod pay_client;
pub use pay_client::{PayClient, PayClientBuilder, RawResponse};

mod wechat_pay;
pub use wechat_pay::WechatPay;

mod builder;
pub use builder::WechatPayBuilder;
