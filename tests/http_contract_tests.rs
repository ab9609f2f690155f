//! HTTP Contract Tests for the WeChat Pay client
//!
//! These tests cover the failure policy shared by every operation:
//! - transport and decode errors abort with `Err`
//! - response signature problems are reported next to a usable envelope
//! - outgoing requests carry the signing headers

use std::sync::Arc;

use wechat_pay_smartguide::crypto::{
    build_request_message, build_response_message, HmacSha256Signer, RequestSigner,
    ResponseVerifier,
};
use wechat_pay_smartguide::error::{HttpError, WechatPayError};
use wechat_pay_smartguide::types::{BodyMap, MchId, SerialNo};
use wechat_pay_smartguide::WechatPay;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "contract_test_key";

fn hmac() -> Arc<HmacSha256Signer> {
    Arc::new(HmacSha256Signer::new(API_KEY).unwrap())
}

fn base_builder(base_url: String) -> wechat_pay_smartguide::WechatPayBuilder {
    WechatPay::builder()
        .mchid(MchId::new("1900000109").unwrap())
        .serial_no(SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1").unwrap())
        .signer(hmac())
        .base_url(base_url)
}

fn signed(status: u16, signed_body: &str, sent_body: &str) -> ResponseTemplate {
    let message = build_response_message("1554209980", "nonce123", signed_body);
    let signature = hmac().sign(message.as_bytes()).unwrap();
    ResponseTemplate::new(status)
        .insert_header("Wechatpay-Timestamp", "1554209980")
        .insert_header("Wechatpay-Nonce", "nonce123")
        .insert_header("Wechatpay-Signature", signature.as_str())
        .insert_header("Wechatpay-Serial", "PUB_KEY_ID_0114232012")
        .set_body_raw(sent_body.to_string(), "application/json")
}

fn query_params() -> BodyMap {
    let mut bm = BodyMap::new();
    bm.set("store_id", 1234);
    bm
}

/// Test: 200 with a malformed body aborts with a decode error
#[tokio::test]
async fn test_malformed_json_returns_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/smartguide/guides"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri()).build().unwrap();
    let result = wechat.smart_guide_query(&query_params()).await;

    match result {
        Err(WechatPayError::Http(HttpError::Decode(message))) => {
            assert!(message.contains("not json"));
        }
        other => panic!("Expected decode error, got: {:?}", other),
    }
}

/// Test: an unreachable server is a transport error
#[tokio::test]
async fn test_connection_refused_returns_http_error() {
    let wechat = base_builder("http://127.0.0.1:1".to_string())
        .build()
        .unwrap();

    let result = wechat.smart_guide_assign("G1", "T1").await;

    assert!(
        matches!(result, Err(WechatPayError::Http(HttpError::Reqwest(_)))),
        "Expected transport error, got: {:?}",
        result
    );
}

/// Test: non-success status with an undecodable body is still an envelope
#[tokio::test]
async fn test_error_status_body_is_not_decoded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smartguide/guides"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri()).build().unwrap();
    let resp = wechat.smart_guide_register(&BodyMap::new()).await.unwrap();

    assert_eq!(resp.code, 502);
    assert_eq!(resp.error, "<html>bad gateway</html>");
}

/// Test: a tampered body keeps the decoded response and reports the failure
#[tokio::test]
async fn test_tampered_response_returns_both() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smartguide/guides"))
        .respond_with(signed(
            200,
            r#"{"guide_id":"ORIGINAL"}"#,
            r#"{"guide_id":"FORGED"}"#,
        ))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri())
        .verifier(hmac())
        .build()
        .unwrap();
    let resp = wechat.smart_guide_register(&BodyMap::new()).await.unwrap();

    assert_eq!(resp.code, 0);
    assert!(matches!(
        resp.verify_result(),
        Err(WechatPayError::Signature(_))
    ));
    assert_eq!(resp.response.as_ref().unwrap().guide_id, "FORGED");

    let fatal = resp.into_verified();
    assert!(matches!(fatal, Err(WechatPayError::Signature(_))));
}

/// Test: a verifier with no signature headers to check reports a failure
#[tokio::test]
async fn test_missing_signature_headers_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v3/smartguide/guides/G1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri())
        .verifier(hmac())
        .build()
        .unwrap();

    let mut params = BodyMap::new();
    params.set("guide_id", "G1").set("name", "x");
    let resp = wechat.smart_guide_update(params).await.unwrap();

    assert_eq!(resp.code, 0);
    let err = resp.verify_result().unwrap_err();
    assert!(err.to_string().contains("Wechatpay-"));
}

/// Test: without a verifier, signature headers are not required
#[tokio::test]
async fn test_no_verifier_skips_check() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smartguide/guides/G1/assign"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri()).build().unwrap();
    let resp = wechat.smart_guide_assign("G1", "T1").await.unwrap();

    assert!(resp.into_verified().is_ok());
}

/// Test: outgoing requests carry the signing headers
#[tokio::test]
async fn test_request_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/smartguide/guides/G1/assign"))
        .and(header_exists("Authorization"))
        .and(header("Accept", "application/json"))
        .and(header("Content-Type", "application/json"))
        .and(header("Wechatpay-Serial", "PUB_KEY_ID_0114232012"))
        .and(header_exists("User-Agent"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri())
        .platform_serial(SerialNo::new("PUB_KEY_ID_0114232012").unwrap())
        .build()
        .unwrap();

    let resp = wechat.smart_guide_assign("G1", "T1").await.unwrap();
    assert_eq!(resp.code, 0);
}

/// Test: the server can recompute the request signature from what it received
#[tokio::test]
async fn test_authorization_matches_sent_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v3/smartguide/guides"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"data":[],"total_count":0,"limit":0,"offset":0}"#,
        ))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri()).build().unwrap();
    let mut params = query_params();
    params.set("userid", "robert");
    let resp = wechat.smart_guide_query(&params).await.unwrap();
    assert_eq!(resp.code, 0);

    let requests = mock_server.received_requests().await.unwrap();
    let authorization = requests[0]
        .headers
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let field = |name: &str| -> String {
        let key = format!("{name}=\"");
        let start = authorization.find(&key).unwrap() + key.len();
        let end = authorization[start..].find('"').unwrap() + start;
        authorization[start..end].to_string()
    };

    assert!(authorization.starts_with("WECHATPAY2-SHA256-RSA2048 "));
    assert_eq!(field("mchid"), "1900000109");

    let uri = format!(
        "{}?{}",
        requests[0].url.path(),
        requests[0].url.query().unwrap()
    );
    let message = build_request_message(
        "GET",
        &uri,
        field("timestamp").parse().unwrap(),
        &field("nonce_str"),
        "",
    );
    assert!(hmac()
        .verify("", message.as_bytes(), &field("signature"))
        .is_ok());
}

/// Test: the PATCH signature covers the guide path and the body without guide_id
#[tokio::test]
async fn test_update_authorization_matches_sent_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/v3/smartguide/guides/LLA3WJ6DSZUfiaZDS79FH5Wm5m4X69TBic"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let wechat = base_builder(mock_server.uri()).build().unwrap();
    let mut bm = BodyMap::new();
    bm.set("guide_id", "LLA3WJ6DSZUfiaZDS79FH5Wm5m4X69TBic")
        .set("name", "pVd1HJ6zyvPedzGaV+X3qtmrq9bb9tPROvwia4ibL+F6mfjbzQIzfb3HHLEjZ4YiR/cJiCrZxnAqi+pjeKIEdkwzXRAI7FUhrfPK3SNjaBTEu9GmsugMIA9r3x887Q+ODuC8HH2nzAn7NGpE/e3yiHgWhk0ps5k5DP/2qIdGdONoDzZelrxCl/NWWNUyB93K9F+jC1JX2IMttdY+aQ6zBlw0xnOiNW6Hzy7UtC+xriudjD5APomty7/mYNxLMpRSvWKIjOv/69bDnuC4EL5Kz4jBHLiCyOb+tI0m2qhZ9evAM+Jv1z0NVa8MRtelw/wDa4SzfeespQO/0kjiwfqdfg==");
    let resp = wechat.smart_guide_update(bm).await.unwrap();
    assert_eq!(resp.code, 0);

    let requests = mock_server.received_requests().await.unwrap();
    let request = &requests[0];
    let authorization = request
        .headers
        .get("Authorization")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let field = |name: &str| -> String {
        let key = format!("{name}=\"");
        let start = authorization.find(&key).unwrap() + key.len();
        let end = authorization[start..].find('"').unwrap() + start;
        authorization[start..end].to_string()
    };

    let sent_body = String::from_utf8(request.body.clone()).unwrap();
    assert!(!sent_body.contains("guide_id"));

    let message = build_request_message(
        "PATCH",
        request.url.path(),
        field("timestamp").parse().unwrap(),
        &field("nonce_str"),
        &sent_body,
    );
    assert!(hmac()
        .verify("", message.as_bytes(), &field("signature"))
        .is_ok());
}
