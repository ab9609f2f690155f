//! Smart Guide usage example for wechat-pay-smartguide
//!
//! Run with: cargo run --example smartguide_usage
//!
//! Set `WECHATPAY_BASE_URL` to a sandbox or mock server to also send a
//! guide query.

use std::sync::Arc;

use http::Method;
use wechat_pay_smartguide::{
    crypto::HmacSha256Signer,
    types::{BodyMap, MchId, SerialNo},
    WechatPay,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::var("WECHATPAY_BASE_URL").ok();

    let mut builder = WechatPay::builder()
        .mchid(MchId::new("1900000109")?)
        .serial_no(SerialNo::new("5157F09EFDC096DE15EBE81A47057A7232F1B8E1")?)
        .signer(Arc::new(HmacSha256Signer::new("your_api_key_here")?));
    if let Some(url) = &base_url {
        builder = builder.base_url(url.as_str());
    }
    let wechat = builder.build()?;

    println!("Client created successfully!");
    println!("MchId: {}", wechat.mchid());

    let mut params = BodyMap::new();
    params.set("store_id", 1234).set("limit", 5).set("offset", 0);
    let uri = format!("/v3/smartguide/guides?{}", params.encode_get_params());

    let authorization = wechat
        .client()
        .authorization::<BodyMap>(&Method::GET, &uri, None)?;
    println!("GET {}", uri);
    println!("Authorization: {}", authorization);

    if base_url.is_some() {
        let resp = wechat.smart_guide_query(&params).await?;
        if let Err(e) = resp.verify_result() {
            println!("Response signature not verified: {}", e);
        }
        match resp.response {
            Some(page) => println!("Found {} guides", page.total_count),
            None => println!("Query failed with status {}: {}", resp.code, resp.error),
        }
    }

    Ok(())
}
