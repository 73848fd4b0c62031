//! reqwestによるHTTP通信
//!
//! ステータスやContent-Typeの判定はしない（共通ライブラリ側のデコーダーに任せる）

use crate::error::Result;
use narrato_common::{RawResponse, Transport, TransportError};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds.max(1)))
            .build()?;
        Ok(Self { client })
    }

    /// 設定済みのクライアントを使う
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: String) -> std::result::Result<RawResponse, TransportError> {
        tracing::debug!("POST {} ({} bytes)", url, body.len());

        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| TransportError(describe(&e)))?;

        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .text()
            .await
            .map_err(|e| TransportError(describe(&e)))?;

        tracing::debug!("{} responded {} ({} bytes)", url, status, body.len());
        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

fn describe(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("Request timed out: {}", err)
    } else if err.is_connect() {
        format!("Could not reach the server: {}", err)
    } else {
        err.to_string()
    }
}
