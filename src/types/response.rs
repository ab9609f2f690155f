use crate::error::WechatPayError;

/// `code` value of a successful call
pub const SUCCESS: u16 = 0;

/// Response signature material captured from a WeChat Pay reply.
///
/// Filled in by the transport and consumed by
/// [`PayClient::verify_sync_sign`](crate::client::PayClient::verify_sync_sign).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInfo {
    pub(crate) timestamp: String,
    pub(crate) nonce: String,
    pub(crate) signature: String,
    pub(crate) serial: String,
    pub(crate) body: String,
}

impl SignInfo {
    pub fn new(
        timestamp: impl Into<String>,
        nonce: impl Into<String>,
        signature: impl Into<String>,
        serial: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            nonce: nonce.into(),
            signature: signature.into(),
            serial: serial.into(),
            body: body.into(),
        }
    }

    /// `Wechatpay-Timestamp` header
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// `Wechatpay-Nonce` header
    pub fn nonce(&self) -> &str {
        &self.nonce
    }

    /// `Wechatpay-Signature` header
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// `Wechatpay-Serial` header
    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Raw response body the signature covers
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Response envelope returned by every WeChat Pay operation.
///
/// A non-success HTTP status is not an `Err`: it is stored in [`code`](Self::code)
/// with the raw body in [`error`](Self::error). The signature check outcome is
/// kept separately and must be inspected with [`verify_result`](Self::verify_result)
/// or enforced with [`into_verified`](Self::into_verified).
#[must_use]
#[derive(Debug)]
pub struct PayResponse<T> {
    /// `0` on success, otherwise the HTTP status returned by the server
    pub code: u16,
    /// Raw response body when `code != 0`
    pub error: String,
    pub sign_info: SignInfo,
    /// Decoded body, only present on success for operations that return one
    pub response: Option<T>,
    pub(crate) verify_error: Option<WechatPayError>,
}

/// Envelope of operations answering `204 No Content`
pub type EmptyResponse = PayResponse<()>;

impl<T> PayResponse<T> {
    pub(crate) fn success(sign_info: SignInfo, response: Option<T>) -> Self {
        Self {
            code: SUCCESS,
            error: String::new(),
            sign_info,
            response,
            verify_error: None,
        }
    }

    pub(crate) fn failure(status: u16, body: &[u8], sign_info: SignInfo) -> Self {
        Self {
            code: status,
            error: String::from_utf8_lossy(body).into_owned(),
            sign_info,
            response: None,
            verify_error: None,
        }
    }

    pub(crate) fn with_verification(mut self, result: Result<(), WechatPayError>) -> Self {
        self.verify_error = result.err();
        self
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS
    }

    /// Outcome of the response signature check.
    pub fn verify_result(&self) -> Result<(), &WechatPayError> {
        match &self.verify_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Treat a failed signature check as fatal.
    pub fn into_verified(mut self) -> Result<Self, WechatPayError> {
        match self.verify_error.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_raw_body() {
        let resp: PayResponse<()> = PayResponse::failure(
            400,
            br#"{"code":"PARAM_ERROR","message":"bad store_id"}"#,
            SignInfo::default(),
        );
        assert_eq!(resp.code, 400);
        assert!(!resp.is_success());
        assert!(resp.error.contains("PARAM_ERROR"));
        assert!(resp.response.is_none());
    }

    #[test]
    fn test_verification_error_kept_alongside_response() {
        let resp = PayResponse::success(SignInfo::default(), Some(7)).with_verification(Err(
            WechatPayError::Signature("mismatch".to_string()),
        ));
        assert!(resp.is_success());
        assert_eq!(resp.response, Some(7));
        assert!(resp.verify_result().is_err());
        assert!(matches!(
            resp.into_verified(),
            Err(WechatPayError::Signature(_))
        ));
    }

    #[test]
    fn test_into_verified_passes_clean_response() {
        let resp = PayResponse::success(SignInfo::default(), Some("ok")).with_verification(Ok(()));
        let resp = resp.into_verified().unwrap();
        assert_eq!(resp.response, Some("ok"));
    }
}
