//! エラー型定義

use thiserror::Error;

use crate::decoder::DecodeError;

/// 生成失敗時の汎用メッセージ
pub const GENERIC_GENERATION_FAILURE: &str = "Summary generation failed";

/// 入力不足時のバナー文言
pub const INSUFFICIENT_INPUT_MESSAGE: &str = "Please provide enough text to summarize.";

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    /// 入力テキストが短すぎる（リクエストは送信されない）
    #[error("Insufficient input: at least {min} characters are required")]
    InsufficientInput { min: usize },

    /// リモートAPIへの通信失敗
    #[error("Network error: {0}")]
    Network(String),

    /// APIには到達したが失敗ステータス、またはデコード不能なボディ
    #[error("{message}")]
    GenerationFailed {
        message: String,
        #[source]
        source: Option<DecodeError>,
    },

    #[error(transparent)]
    InvalidResponseBody(#[from] DecodeError),

    /// 音声合成の失敗（ローカル読み上げにフォールバックするのみ）
    #[error("TTS unavailable: {0}")]
    TtsUnavailable(String),

    /// より新しいリクエストが発行済みのため破棄されたレスポンス
    #[error("Response discarded: request #{seq} was superseded by #{latest}")]
    Superseded { seq: u64, latest: u64 },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Error::GenerationFailed {
            message: message.into(),
            source: None,
        }
    }

    /// バナーに表示する文言
    ///
    /// 生成系のエラーはすべて1行の文字列にまとめて表示する
    pub fn banner_message(&self) -> String {
        match self {
            Error::InsufficientInput { .. } => INSUFFICIENT_INPUT_MESSAGE.to_string(),
            Error::Network(msg) => format!("Error: {}", msg),
            Error::GenerationFailed { message, .. } => format!("Error: {}", message),
            other => format!("Error: {}", other),
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
