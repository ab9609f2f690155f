//! Unified WeChat Pay SDK client

use std::sync::Arc;

use crate::api::smartguide::{SmartGuideApi, SmartGuideQuery, SmartGuideReg};
use crate::api::PayContext;
use crate::error::WechatPayError;
use crate::types::{BodyMap, EmptyResponse, PayResponse};

use super::PayClient;

/// Unified WeChat Pay client
///
/// This is the main entry point for the SDK.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use wechat_pay_smartguide::WechatPay;
/// use wechat_pay_smartguide::types::{BodyMap, MchId, SerialNo};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let wechat = WechatPay::builder()
///         .mchid(MchId::new("1900000109")?)
///         .serial_no(SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1")?)
///         .signer(Arc::new(my_rsa_signer))
///         .build()?;
///
///     let mut params = BodyMap::new();
///     params.set("store_id", 1234);
///     let resp = wechat.smart_guide_query(&params).await?;
///     if let Err(e) = resp.verify_result() {
///         eprintln!("unverified response: {}", e);
///     }
///     println!("guides: {:?}", resp.response);
///
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WechatPay {
    context: Arc<PayContext>,
}

impl std::fmt::Debug for WechatPay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatPay")
            .field("mchid", &self.mchid())
            .finish_non_exhaustive()
    }
}

impl From<Arc<PayContext>> for WechatPay {
    fn from(context: Arc<PayContext>) -> Self {
        Self { context }
    }
}

impl WechatPay {
    pub fn builder() -> super::builder::WechatPayBuilder {
        super::builder::WechatPayBuilder::default()
    }

    pub fn mchid(&self) -> &str {
        self.context.client.mchid()
    }

    /// The shared signing/transport client
    pub fn client(&self) -> &PayClient {
        &self.context.client
    }

    pub fn v3_encrypt_text(&self, text: &str) -> Result<String, WechatPayError> {
        self.context.client.v3_encrypt_text(text)
    }

    pub fn v3_decrypt_text(&self, cipher_text: &str) -> Result<String, WechatPayError> {
        self.context.client.v3_decrypt_text(cipher_text)
    }

    // Smart Guide API

    pub async fn smart_guide_register(
        &self,
        bm: &BodyMap,
    ) -> Result<PayResponse<SmartGuideReg>, WechatPayError> {
        SmartGuideApi::new(self.context.clone()).register(bm).await
    }

    pub async fn smart_guide_assign(
        &self,
        guide_id: &str,
        out_trade_no: &str,
    ) -> Result<EmptyResponse, WechatPayError> {
        SmartGuideApi::new(self.context.clone())
            .assign(guide_id, out_trade_no)
            .await
    }

    pub async fn smart_guide_query(
        &self,
        bm: &BodyMap,
    ) -> Result<PayResponse<SmartGuideQuery>, WechatPayError> {
        SmartGuideApi::new(self.context.clone()).query(bm).await
    }

    pub async fn smart_guide_update(&self, bm: BodyMap) -> Result<EmptyResponse, WechatPayError> {
        SmartGuideApi::new(self.context.clone()).update(bm).await
    }
}
