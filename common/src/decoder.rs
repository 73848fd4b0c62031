//! HTTPレスポンスデコーダー
//!
//! APIサーバーはプロキシ障害や認証リダイレクト時にHTMLのエラーページを
//! 返すことがあるため、JSONとして読めないボディも型付きエラーとして扱う。

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// 診断用スニペットの最大文字数
pub const SNIPPET_MAX_CHARS: usize = 250;

/// デコード失敗の分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    InvalidResponseBody,
}

/// デコード失敗
///
/// `snippet` はボディ先頭250文字（改行は空白に置換）で、診断専用
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid JSON response from server: {snippet}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub snippet: String,
}

impl DecodeError {
    fn invalid_body(body: &str) -> Self {
        Self {
            kind: DecodeErrorKind::InvalidResponseBody,
            snippet: snippet(body),
        }
    }
}

pub type DecodeResult = std::result::Result<Value, DecodeError>;

/// レスポンスをデコード
///
/// 判定順序:
/// 1. Content-Typeが `application/json`、またはボディが `{` / `[` で始まる場合のみ厳密パース
/// 2. 失敗したら最初の `{` から最後の `}` までを切り出して再パース
/// 3. それ以外は `InvalidResponseBody`
///
/// # Examples
/// ```
/// use narrato_common::decode;
///
/// let value = decode(Some("application/json"), r#"{"summaryText": "X"}"#).unwrap();
/// assert_eq!(value["summaryText"], "X");
///
/// assert!(decode(Some("text/html"), "<html>502 Bad Gateway</html>").is_err());
/// ```
pub fn decode(content_type: Option<&str>, body: &str) -> DecodeResult {
    let declared_json = content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);
    let trimmed = body.trim();
    let looks_like_json = trimmed.starts_with('{') || trimmed.starts_with('[');

    if declared_json || looks_like_json {
        if let Ok(value) = serde_json::from_str::<Value>(body) {
            return Ok(value);
        }
        if let Some(embedded) = find_embedded_object(body) {
            if let Ok(value) = serde_json::from_str::<Value>(embedded) {
                tracing::debug!("recovered embedded JSON object ({} bytes)", embedded.len());
                return Ok(value);
            }
        }
    }

    Err(DecodeError::invalid_body(body))
}

/// 最初の `{` から最後の `}` までを返す
fn find_embedded_object(body: &str) -> Option<&str> {
    lazy_static::lazy_static! {
        static ref OBJECT_RE: Regex = Regex::new(r"(?s)\{.*\}").unwrap();
    }

    OBJECT_RE.find(body).map(|m| m.as_str())
}

/// 診断用スニペットを作成
pub fn snippet(body: &str) -> String {
    body.chars()
        .take(SNIPPET_MAX_CHARS)
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
