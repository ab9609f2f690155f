//! WeChat Pay HTTP Client
//!
//! Signs requests, dispatches them and captures the response signature
//! material for the V3 API.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use http::Method;
use log::debug;
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::Serialize;
use tower::Service;

use crate::crypto::{
    build_request_message, build_response_message, format_authorization, generate_nonce,
    RequestSigner, ResponseVerifier, SensitiveCipher,
};
use crate::error::WechatPayError;
use crate::types::{MchId, SerialNo, SignInfo};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const HEADER_TIMESTAMP: &str = "Wechatpay-Timestamp";
const HEADER_NONCE: &str = "Wechatpay-Nonce";
const HEADER_SIGNATURE: &str = "Wechatpay-Signature";
const HEADER_SERIAL: &str = "Wechatpay-Serial";

const SDK_USER_AGENT: &str = concat!("wechat-pay-smartguide/", env!("CARGO_PKG_VERSION"));

pub(crate) type MiddlewareFuture =
    Pin<Box<dyn Future<Output = Result<reqwest::Response, reqwest::Error>> + Send>>;
pub(crate) type MiddlewareExecutor =
    Arc<dyn Fn(reqwest::Request) -> MiddlewareFuture + Send + Sync>;

/// Raw outcome of a signed call: status, signature material and body bytes
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub sign_info: SignInfo,
    pub body: Vec<u8>,
}

/// WeChat Pay API Client
///
/// Builds `Authorization` headers, sends requests and verifies response
/// signatures. Cheap to clone; all shared parts sit behind `Arc`.
#[derive(Clone)]
pub struct PayClient {
    http: Client,
    mchid: MchId,
    serial_no: SerialNo,
    platform_serial: Option<SerialNo>,
    signer: Arc<dyn RequestSigner>,
    verifier: Option<Arc<dyn ResponseVerifier>>,
    cipher: Option<Arc<dyn SensitiveCipher>>,
    base_url: String,
    middleware_executor: Option<MiddlewareExecutor>,
}

impl std::fmt::Debug for PayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayClient")
            .field("mchid", &self.mchid)
            .field("serial_no", &self.serial_no)
            .field("platform_serial", &self.platform_serial)
            .field("base_url", &self.base_url)
            .field("verifier", &self.verifier.as_ref().map(|_| ".."))
            .field(
                "middleware_executor",
                &self.middleware_executor.as_ref().map(|_| ".."),
            )
            .finish_non_exhaustive()
    }
}

impl PayClient {
    /// Create a new client builder
    pub fn builder() -> PayClientBuilder {
        PayClientBuilder::default()
    }

    /// Get the merchant id
    pub fn mchid(&self) -> &str {
        self.mchid.as_str()
    }

    /// Get the merchant certificate serial number
    pub fn serial_no(&self) -> &str {
        self.serial_no.as_str()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the underlying [`reqwest::Client`] for raw HTTP requests.
    ///
    /// Note: requests made through this client are neither signed nor routed
    /// through the middleware pipeline.
    pub fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn with_middleware_executor(mut self, executor: MiddlewareExecutor) -> Self {
        self.middleware_executor = Some(executor);
        self
    }

    /// Compute the `Authorization` header for one request.
    ///
    /// `path` is the request URI including any query string. `body` is
    /// `None` for GET requests.
    pub fn authorization<B: Serialize + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, WechatPayError> {
        let body = match body {
            Some(body) => serde_json::to_string(body)?,
            None => String::new(),
        };
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| WechatPayError::Crypto(format!("System clock before epoch: {}", e)))?
            .as_secs();
        let timestamp = i64::try_from(timestamp)
            .map_err(|e| WechatPayError::Crypto(format!("Timestamp overflow: {}", e)))?;
        let nonce = generate_nonce();

        let message = build_request_message(method.as_str(), path, timestamp, &nonce, &body);
        let signature = self.signer.sign(message.as_bytes())?;

        Ok(format_authorization(
            self.signer.schema(),
            self.mchid.as_str(),
            &nonce,
            timestamp,
            self.serial_no.as_str(),
            &signature,
        ))
    }

    /// Send a signed POST with a JSON body
    pub async fn do_prod_post<B: Serialize + ?Sized>(
        &self,
        body: &B,
        path: &str,
        authorization: &str,
    ) -> Result<RawResponse, WechatPayError> {
        let body = serde_json::to_string(body)?;
        self.do_request(Method::POST, path, Some(body), authorization)
            .await
    }

    /// Send a signed GET; `path` already carries the query string
    pub async fn do_prod_get(
        &self,
        path: &str,
        authorization: &str,
    ) -> Result<RawResponse, WechatPayError> {
        self.do_request(Method::GET, path, None, authorization).await
    }

    /// Send a signed PATCH with a JSON body
    pub async fn do_prod_patch<B: Serialize + ?Sized>(
        &self,
        body: &B,
        path: &str,
        authorization: &str,
    ) -> Result<RawResponse, WechatPayError> {
        let body = serde_json::to_string(body)?;
        self.do_request(Method::PATCH, path, Some(body), authorization)
            .await
    }

    /// Check the response signature carried by `sign_info`.
    ///
    /// Always succeeds when no [`ResponseVerifier`] is configured.
    pub fn verify_sync_sign(&self, sign_info: &SignInfo) -> Result<(), WechatPayError> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };

        for (header, value) in [
            (HEADER_TIMESTAMP, sign_info.timestamp()),
            (HEADER_NONCE, sign_info.nonce()),
            (HEADER_SIGNATURE, sign_info.signature()),
            (HEADER_SERIAL, sign_info.serial()),
        ] {
            if value.is_empty() {
                return Err(WechatPayError::Signature(format!(
                    "missing {} header",
                    header
                )));
            }
        }

        let message =
            build_response_message(sign_info.timestamp(), sign_info.nonce(), sign_info.body());
        verifier.verify(sign_info.serial(), message.as_bytes(), sign_info.signature())
    }

    /// Encrypt a sensitive request field with the configured cipher
    pub fn v3_encrypt_text(&self, text: &str) -> Result<String, WechatPayError> {
        self.cipher()?.encrypt_text(text)
    }

    /// Decrypt a sensitive response field with the configured cipher
    pub fn v3_decrypt_text(&self, cipher_text: &str) -> Result<String, WechatPayError> {
        self.cipher()?.decrypt_text(cipher_text)
    }

    fn cipher(&self) -> Result<&Arc<dyn SensitiveCipher>, WechatPayError> {
        self.cipher
            .as_ref()
            .ok_or_else(|| WechatPayError::Config("no sensitive cipher configured".to_string()))
    }

    pub(crate) async fn send_request(
        &self,
        request: reqwest::Request,
    ) -> Result<reqwest::Response, reqwest::Error> {
        if let Some(executor) = &self.middleware_executor {
            (executor)(request).await
        } else {
            self.http.execute(request).await
        }
    }

    async fn do_request(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
        authorization: &str,
    ) -> Result<RawResponse, WechatPayError> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[WechatPay] dispatch {} {}", method, path);

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, SDK_USER_AGENT);
        if let Some(serial) = &self.platform_serial {
            builder = builder.header(HEADER_SERIAL, serial.as_str());
        }
        if let Some(body) = body {
            builder = builder.header(CONTENT_TYPE, "application/json").body(body);
        }
        let request = builder.build()?;

        let response = self.send_request(request).await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        let sign_info = sign_info_from(&headers, &body);
        Ok(RawResponse {
            status,
            sign_info,
            body,
        })
    }
}

fn sign_info_from(headers: &HeaderMap, body: &[u8]) -> SignInfo {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    SignInfo::new(
        header(HEADER_TIMESTAMP),
        header(HEADER_NONCE),
        header(HEADER_SIGNATURE),
        header(HEADER_SERIAL),
        String::from_utf8_lossy(body),
    )
}

impl Service<reqwest::Request> for PayClient {
    type Response = reqwest::Response;
    type Error = reqwest::Error;
    type Future = MiddlewareFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: reqwest::Request) -> Self::Future {
        let client = self.http.clone();
        Box::pin(async move { client.execute(req).await })
    }
}

/// Builder for PayClient
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use wechat_pay_smartguide::client::PayClient;
/// use wechat_pay_smartguide::crypto::HmacSha256Signer;
/// use wechat_pay_smartguide::types::{MchId, SerialNo};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = PayClient::builder()
///         .mchid(MchId::new("1900000109")?)
///         .serial_no(SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1")?)
///         .signer(Arc::new(HmacSha256Signer::new("api_key")?))
///         .build()?;
///
///     assert_eq!(client.mchid(), "1900000109");
///     Ok(())
/// }
/// ```
#[derive(Default)]
pub struct PayClientBuilder {
    mchid: Option<MchId>,
    serial_no: Option<SerialNo>,
    platform_serial: Option<SerialNo>,
    signer: Option<Arc<dyn RequestSigner>>,
    verifier: Option<Arc<dyn ResponseVerifier>>,
    cipher: Option<Arc<dyn SensitiveCipher>>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl std::fmt::Debug for PayClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayClientBuilder")
            .field("mchid", &self.mchid)
            .field("serial_no", &self.serial_no)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish_non_exhaustive()
    }
}

impl PayClientBuilder {
    /// Set the merchant id
    pub fn mchid(mut self, mchid: MchId) -> Self {
        self.mchid = Some(mchid);
        self
    }

    /// Set the merchant API certificate serial number
    pub fn serial_no(mut self, serial_no: SerialNo) -> Self {
        self.serial_no = Some(serial_no);
        self
    }

    /// Set the platform certificate / public key serial sent as
    /// `Wechatpay-Serial` when request fields are encrypted
    pub fn platform_serial(mut self, serial: SerialNo) -> Self {
        self.platform_serial = Some(serial);
        self
    }

    /// Set the request signer
    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Set the response signature verifier
    ///
    /// Without one, response signatures are not checked.
    pub fn verifier(mut self, verifier: Arc<dyn ResponseVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Set the cipher backing `v3_encrypt_text` / `v3_decrypt_text`
    pub fn cipher(mut self, cipher: Arc<dyn SensitiveCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    /// Set the base URL for API calls
    ///
    /// Default: `<https://api.mch.weixin.qq.com>`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the total timeout for requests
    ///
    /// Default: 30 seconds
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout
    ///
    /// Default: 10 seconds
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the PayClient
    ///
    /// # Errors
    /// Returns an error if mchid, serial_no or signer is not set, or if
    /// the base URL is not http(s)
    pub fn build(self) -> Result<PayClient, WechatPayError> {
        let mchid = self
            .mchid
            .ok_or_else(|| WechatPayError::Config("mchid is required".to_string()))?;
        let serial_no = self
            .serial_no
            .ok_or_else(|| WechatPayError::Config("serial_no is required".to_string()))?;
        let signer = self
            .signer
            .ok_or_else(|| WechatPayError::Config("signer is required".to_string()))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(WechatPayError::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                base_url
            )));
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(PayClient {
            http: client,
            mchid,
            serial_no,
            platform_serial: self.platform_serial,
            signer,
            verifier: self.verifier,
            cipher: self.cipher,
            base_url,
            middleware_executor: None,
        })
    }
}
