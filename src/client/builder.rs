use std::sync::Arc;
use std::time::Duration;

use reqwest::{Request as ReqwestRequest, Response as ReqwestResponse};
use tower::{Layer, Service};

use crate::api::PayContext;
use crate::crypto::{RequestSigner, ResponseVerifier, SensitiveCipher};
use crate::error::WechatPayError;
use crate::types::{MchId, SerialNo};

use super::pay_client::{
    MiddlewareExecutor, MiddlewareFuture, PayClient, DEFAULT_BASE_URL,
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS,
};
use super::WechatPay;

#[must_use]
#[derive(Default)]
pub struct WechatPayBuilder<M = ()> {
    mchid: Option<MchId>,
    serial_no: Option<SerialNo>,
    platform_serial: Option<SerialNo>,
    signer: Option<Arc<dyn RequestSigner>>,
    verifier: Option<Arc<dyn ResponseVerifier>>,
    cipher: Option<Arc<dyn SensitiveCipher>>,
    base_url: Option<String>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    middleware: Option<M>,
}

impl<M> std::fmt::Debug for WechatPayBuilder<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WechatPayBuilder")
            .field("mchid", &self.mchid)
            .field("serial_no", &self.serial_no)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("middleware", &self.middleware.as_ref().map(|_| ".."))
            .finish_non_exhaustive()
    }
}

impl<M> WechatPayBuilder<M> {
    pub fn mchid(mut self, mchid: MchId) -> Self {
        self.mchid = Some(mchid);
        self
    }

    pub fn serial_no(mut self, serial_no: SerialNo) -> Self {
        self.serial_no = Some(serial_no);
        self
    }

    pub fn platform_serial(mut self, serial: SerialNo) -> Self {
        self.platform_serial = Some(serial);
        self
    }

    pub fn signer(mut self, signer: Arc<dyn RequestSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn verifier(mut self, verifier: Arc<dyn ResponseVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    pub fn cipher(mut self, cipher: Arc<dyn SensitiveCipher>) -> Self {
        self.cipher = Some(cipher);
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_middleware<M2>(self, middleware: M2) -> WechatPayBuilder<M2>
    where
        M2: Layer<PayClient> + Clone + Send + Sync + 'static,
    {
        WechatPayBuilder {
            mchid: self.mchid,
            serial_no: self.serial_no,
            platform_serial: self.platform_serial,
            signer: self.signer,
            verifier: self.verifier,
            cipher: self.cipher,
            base_url: self.base_url,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            middleware: Some(middleware),
        }
    }

    pub fn build(self) -> Result<WechatPay, WechatPayError>
    where
        M: Layer<PayClient> + Clone + Send + Sync + 'static,
        M::Service: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
            + Clone
            + Send
            + Sync
            + 'static,
        <M::Service as Service<ReqwestRequest>>::Future: Send + 'static,
    {
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
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let connect_timeout = self
            .connect_timeout
            .unwrap_or(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS));

        let mut builder = PayClient::builder()
            .mchid(mchid)
            .serial_no(serial_no)
            .signer(signer)
            .base_url(base_url)
            .timeout(timeout)
            .connect_timeout(connect_timeout);
        if let Some(serial) = self.platform_serial {
            builder = builder.platform_serial(serial);
        }
        if let Some(verifier) = self.verifier {
            builder = builder.verifier(verifier);
        }
        if let Some(cipher) = self.cipher {
            builder = builder.cipher(cipher);
        }
        let mut client = builder.build()?;

        if let Some(middleware) = self.middleware {
            let service = middleware.layer(client.clone());
            let executor = make_middleware_executor(service);
            client = client.with_middleware_executor(executor);
        }

        let context = Arc::new(PayContext::new(Arc::new(client)));

        Ok(WechatPay::from(context))
    }
}

fn make_middleware_executor<S>(service: S) -> MiddlewareExecutor
where
    S: Service<ReqwestRequest, Response = ReqwestResponse, Error = reqwest::Error>
        + Clone
        + Send
        + Sync
        + 'static,
    S::Future: Send + 'static,
{
    let service = Arc::new(service);

    Arc::new(move |request: ReqwestRequest| -> MiddlewareFuture {
        let mut service = (*service).clone();
        Box::pin(async move { service.call(request).await })
    })
}
