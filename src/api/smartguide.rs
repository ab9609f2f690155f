//! Smart Guide (service staff) API
//!
//! Register in-store guides, assign them to orders, look them up and
//! update their profile.
//!
//! Sensitive request fields (`name`, `mobile`) must be encrypted by the caller
//! with [`PayClient::v3_encrypt_text`](crate::client::PayClient::v3_encrypt_text)
//! before the call; the same fields come back encrypted from [`SmartGuideApi::query`]
//! and are decrypted with
//! [`PayClient::v3_decrypt_text`](crate::client::PayClient::v3_decrypt_text).

use std::sync::Arc;

use http::Method;
use log::{debug, warn};
use percent_encoding::utf8_percent_encode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{PayContext, WechatPayApi};
use crate::client::RawResponse;
use crate::error::WechatPayError;
use crate::types::body_map::QUERY_VALUE;
use crate::types::{BodyMap, EmptyResponse, PayResponse};

const GUIDES_PATH: &str = "/v3/smartguide/guides";

const REGISTER_OK: u16 = 200;
const ASSIGN_OK: u16 = 204;
const QUERY_OK: u16 = 200;
const UPDATE_OK: u16 = 204;

/// Registration result
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SmartGuideReg {
    #[serde(default)]
    pub guide_id: String,
}

/// One page of guides
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SmartGuideQuery {
    #[serde(default)]
    pub data: Vec<GuideItem>,
    #[serde(default)]
    pub total_count: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GuideItem {
    #[serde(default)]
    pub guide_id: String,
    #[serde(default)]
    pub store_id: u64,
    /// Encrypted
    #[serde(default)]
    pub name: String,
    /// Encrypted
    #[serde(default)]
    pub mobile: String,
    #[serde(default)]
    pub userid: String,
    #[serde(default)]
    pub work_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssignGuideRequest {
    pub out_trade_no: String,
}

fn guide_path(guide_id: &str) -> String {
    format!(
        "{}/{}",
        GUIDES_PATH,
        utf8_percent_encode(guide_id, QUERY_VALUE)
    )
}

fn assign_path(guide_id: &str) -> String {
    format!("{}/assign", guide_path(guide_id))
}

pub struct SmartGuideApi {
    context: Arc<PayContext>,
}

impl SmartGuideApi {
    pub fn new(context: Arc<PayContext>) -> Self {
        Self { context }
    }

    /// Register a guide.
    ///
    /// `POST /v3/smartguide/guides`
    pub async fn register(
        &self,
        bm: &BodyMap,
    ) -> Result<PayResponse<SmartGuideReg>, WechatPayError> {
        let client = self.context().client();
        debug!("[WechatPay] smartguide register");

        let authorization = client.authorization(&Method::POST, GUIDES_PATH, Some(bm))?;
        let raw = client
            .do_prod_post(bm, GUIDES_PATH, &authorization)
            .await?;
        self.json_envelope(raw, REGISTER_OK)
    }

    /// Assign a guide to an order.
    ///
    /// `POST /v3/smartguide/guides/{guide_id}/assign`
    pub async fn assign(
        &self,
        guide_id: &str,
        out_trade_no: &str,
    ) -> Result<EmptyResponse, WechatPayError> {
        if guide_id.is_empty() {
            return Err(WechatPayError::MissingParam("guide_id".to_string()));
        }
        if out_trade_no.is_empty() {
            return Err(WechatPayError::MissingParam("out_trade_no".to_string()));
        }
        let client = self.context().client();
        let path = assign_path(guide_id);
        debug!("[WechatPay] smartguide assign {}", path);

        let body = AssignGuideRequest {
            out_trade_no: out_trade_no.to_string(),
        };
        let authorization = client.authorization(&Method::POST, &path, Some(&body))?;
        let raw = client.do_prod_post(&body, &path, &authorization).await?;
        Ok(self.empty_envelope(raw, ASSIGN_OK))
    }

    /// Query guides of a store. `store_id` is required.
    ///
    /// `GET /v3/smartguide/guides?...`
    pub async fn query(
        &self,
        bm: &BodyMap,
    ) -> Result<PayResponse<SmartGuideQuery>, WechatPayError> {
        bm.check_empty_error(&["store_id"])?;
        let client = self.context().client();
        let uri = format!("{}?{}", GUIDES_PATH, bm.encode_get_params());
        debug!("[WechatPay] smartguide query");

        let authorization = client.authorization::<BodyMap>(&Method::GET, &uri, None)?;
        let raw = client.do_prod_get(&uri, &authorization).await?;
        self.json_envelope(raw, QUERY_OK)
    }

    /// Update a guide. `guide_id` is required and moves from the body
    /// into the path.
    ///
    /// `PATCH /v3/smartguide/guides/{guide_id}`
    pub async fn update(&self, mut bm: BodyMap) -> Result<EmptyResponse, WechatPayError> {
        bm.check_empty_error(&["guide_id"])?;
        let guide_id = bm.get_string("guide_id").unwrap_or_default();
        bm.remove("guide_id");
        let client = self.context().client();
        let path = guide_path(&guide_id);
        debug!("[WechatPay] smartguide update {}", path);

        let authorization = client.authorization(&Method::PATCH, &path, Some(&bm))?;
        let raw = client.do_prod_patch(&bm, &path, &authorization).await?;
        Ok(self.empty_envelope(raw, UPDATE_OK))
    }

    fn json_envelope<T: DeserializeOwned>(
        &self,
        raw: RawResponse,
        expected: u16,
    ) -> Result<PayResponse<T>, WechatPayError> {
        let verification = self.verify(&raw);
        if raw.status != expected {
            warn!(
                "[WechatPay] {} unexpected status {} (expected {})",
                self.api_name(),
                raw.status,
                expected
            );
            return Ok(PayResponse::failure(raw.status, &raw.body, raw.sign_info)
                .with_verification(verification));
        }
        let decoded: T = serde_json::from_slice(&raw.body)
            .map_err(|e| WechatPayError::decode(&raw.body, e))?;
        Ok(PayResponse::success(raw.sign_info, Some(decoded)).with_verification(verification))
    }

    fn empty_envelope(&self, raw: RawResponse, expected: u16) -> EmptyResponse {
        let verification = self.verify(&raw);
        let envelope = if raw.status == expected {
            PayResponse::success(raw.sign_info, None)
        } else {
            warn!(
                "[WechatPay] {} unexpected status {} (expected {})",
                self.api_name(),
                raw.status,
                expected
            );
            PayResponse::failure(raw.status, &raw.body, raw.sign_info)
        };
        envelope.with_verification(verification)
    }

    fn verify(&self, raw: &RawResponse) -> Result<(), WechatPayError> {
        let result = self.context().client().verify_sync_sign(&raw.sign_info);
        if let Err(e) = &result {
            warn!("[WechatPay] {} response verification failed: {}", self.api_name(), e);
        }
        result
    }
}

impl WechatPayApi for SmartGuideApi {
    fn context(&self) -> &PayContext {
        &self.context
    }

    fn api_name(&self) -> &'static str {
        "smartguide"
    }
}
