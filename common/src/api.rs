//! APIエンドポイント設定と通信トレイト
//!
//! 実際のHTTP通信はCLI（reqwest）とWeb（fetch）がそれぞれ実装する

use serde::Serialize;

/// `NARRATO_API_URL` 未設定時の接続先
pub const DEFAULT_BASE_URL: &str = "http://localhost:4000";

/// APIの接続先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        Self {
            base_url: if trimmed.is_empty() {
                DEFAULT_BASE_URL.to_string()
            } else {
                trimmed.to_string()
            },
        }
    }

    pub fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    pub fn tts_url(&self) -> String {
        format!("{}/api/tts", self.base_url)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// 生のHTTPレスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 通信レベルの失敗（接続不可・タイムアウトなど）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSONをPOSTしてレスポンスを返す
///
/// ブラウザ側のFutureは `Send` にならないため `async fn` のまま定義する
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn post_json(&self, url: &str, body: String) -> Result<RawResponse, TransportError>;
}

/// `/api/generate` リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateRequest {
    pub text: String,
    pub title: String,
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// `/api/tts` リクエスト
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TtsRequest<'a> {
    pub text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_config_urls() {
        let config = ApiConfig::new("https://narrato.example.com/");
        assert_eq!(config.generate_url(), "https://narrato.example.com/api/generate");
        assert_eq!(config.tts_url(), "https://narrato.example.com/api/tts");
    }

    #[test]
    fn test_api_config_blank_falls_back_to_default() {
        assert_eq!(ApiConfig::new("  ").base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_generate_request_serialize() {
        let request = GenerateRequest {
            text: "Some text".into(),
            title: "Untitled".into(),
            style: "Comprehensive (Max Length)".into(),
            language: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"text":"Some text","title":"Untitled","style":"Comprehensive (Max Length)"}"#
        );
    }

    #[test]
    fn test_tts_request_serialize() {
        let json = serde_json::to_string(&TtsRequest { text: "Hello" }).unwrap();
        assert_eq!(json, r#"{"text":"Hello"}"#);
    }

    #[test]
    fn test_raw_response_success_range() {
        let ok = RawResponse { status: 204, content_type: None, body: String::new() };
        let err = RawResponse { status: 500, ..ok.clone() };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
