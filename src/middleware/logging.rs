use std::future::Future;
use std::pin::Pin;
use std::time::Instant;

use log::{debug, info};
use reqwest::{Request, Response};
use tower::{Layer, Service};

#[derive(Clone)]
pub struct LoggingMiddleware {
    verbose: bool,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self { verbose: false }
    }

    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
}

impl Default for LoggingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for LoggingMiddleware
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Service = LoggingMiddlewareService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LoggingMiddlewareService {
            inner,
            verbose: self.verbose,
        }
    }
}

#[derive(Clone)]
pub struct LoggingMiddlewareService<S> {
    inner: S,
    verbose: bool,
}

// personal data of guides and signing material
const SENSITIVE_FIELDS: &[&str] = &[
    "mobile",
    "name",
    "userid",
    "work_id",
    "authorization",
    "signature",
];

impl<S> LoggingMiddlewareService<S> {
    fn redact_url(url: &str) -> String {
        let Some((base, query)) = url.split_once('?') else {
            return url.to_string();
        };
        let redacted_query = query
            .split('&')
            .map(|param| match param.split_once('=') {
                Some((key, _)) if SENSITIVE_FIELDS.iter().any(|s| key.eq_ignore_ascii_case(s)) => {
                    format!("{}=[REDACTED]", key)
                }
                _ => param.to_string(),
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", base, redacted_query)
    }

    fn log_request(method: &str, url: &str, signed: bool, verbose: bool) {
        let safe_url = Self::redact_url(url);
        if verbose {
            debug!("[WechatPay] >>> {} {} (signed: {})", method, safe_url, signed);
        } else {
            info!("[WechatPay] {} {}", method, safe_url);
        }
    }

    fn log_response(status: u16, request_id: Option<&str>, duration: std::time::Duration, verbose: bool) {
        if verbose {
            debug!(
                "[WechatPay] <<< {} - {} request-id={} ({:?})",
                status,
                Self::status_text(status),
                request_id.unwrap_or("-"),
                duration
            );
        } else {
            info!("[WechatPay] {} ({:?})", status, duration);
        }
    }

    fn status_text(status: u16) -> &'static str {
        match status {
            200 => "OK",
            202 => "Accepted",
            204 => "No Content",
            400 => "Bad Request",
            401 => "Unauthorized",
            403 => "Forbidden",
            404 => "Not Found",
            429 => "Too Many Requests",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            503 => "Service Unavailable",
            _ => "",
        }
    }
}

impl<S, Error> Service<Request> for LoggingMiddlewareService<S>
where
    S: Service<Request, Response = Response, Error = Error> + Send + Clone + 'static,
    S::Future: Send,
    Error: Send + 'static,
{
    type Response = Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().as_str().to_string();
        let url = req.url().to_string();
        let signed = req.headers().contains_key(reqwest::header::AUTHORIZATION);
        let verbose = self.verbose;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            Self::log_request(&method, &url, signed, verbose);

            let start = Instant::now();
            let response = inner.call(req).await?;
            let duration = start.elapsed();

            let request_id = response
                .headers()
                .get("Request-ID")
                .and_then(|v| v.to_str().ok());
            Self::log_response(response.status().as_u16(), request_id, duration, verbose);

            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn test_redact_url_no_sensitive_params() {
        let url = "https://api.mch.weixin.qq.com/v3/smartguide/guides?store_id=1234&limit=10";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert_eq!(redacted, url);
    }

    #[test]
    fn test_redact_url_with_mobile() {
        let url = "https://api.mch.weixin.qq.com/v3/smartguide/guides?mobile=pVd1HJ6z&store_id=1234";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("mobile=[REDACTED]"));
        assert!(redacted.contains("store_id=1234"));
    }

    #[test]
    fn test_redact_url_case_insensitive() {
        let url = "https://api.mch.weixin.qq.com/v3/smartguide/guides?UserId=robert&store_id=1";
        let redacted = LoggingMiddlewareService::<()>::redact_url(url);
        assert!(redacted.contains("UserId=[REDACTED]"));
        assert!(!redacted.contains("robert"));
    }

    #[test]
    fn test_redact_url_without_query() {
        let url = "https://api.mch.weixin.qq.com/v3/smartguide/guides/G1";
        assert_eq!(LoggingMiddlewareService::<()>::redact_url(url), url);
    }

    #[test]
    fn test_status_text() {
        assert_eq!(LoggingMiddlewareService::<()>::status_text(200), "OK");
        assert_eq!(LoggingMiddlewareService::<()>::status_text(204), "No Content");
        assert_eq!(
            LoggingMiddlewareService::<()>::status_text(401),
            "Unauthorized"
        );
        assert_eq!(LoggingMiddlewareService::<()>::status_text(418), "");
    }

    #[tokio::test]
    async fn test_logging_middleware_passes_response_through() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await.unwrap();

            let response = "HTTP/1.1 204 No Content\r\nRequest-ID: 08F78BB5AF0D11E9\r\n\r\n";
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = Client::builder().build().unwrap();

        let middleware = LoggingMiddleware::new().verbose();
        let mut service = middleware.layer(client.clone());

        let url = format!("http://{}/v3/smartguide/guides?mobile=secret&store_id=1", addr);
        let req = client.get(&url).build().unwrap();

        let response = service.call(req).await.unwrap();
        assert_eq!(response.status().as_u16(), 204);

        let _ = server.await;
    }
}
