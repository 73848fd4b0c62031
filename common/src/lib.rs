//! Narrato Common Library
//!
//! CLIとWeb(WASM)で共有される型とロジック
//!
//! - decoder: HTMLエラーページにも耐えるレスポンスデコーダー
//! - normalizer: ファイル/サンプル → UploadState
//! - pipeline: 要約生成（Session）
//! - narrator: 読み上げ（TTS + ローカルフォールバック）
//! - store: 要約・メモの保存先

pub mod api;
pub mod decoder;
pub mod error;
pub mod narrator;
pub mod normalizer;
pub mod pipeline;
pub mod samples;
pub mod store;
pub mod types;

pub use api::{ApiConfig, RawResponse, Transport, TransportError, DEFAULT_BASE_URL};
pub use decoder::{decode, DecodeError, DecodeErrorKind, DecodeResult};
pub use error::{Error, Result};
pub use narrator::{extract_audio, AudioClip, AudioSink, Narrator, Playback};
pub use normalizer::{first_file, normalize_file, normalize_sample};
pub use pipeline::{generate, PendingGeneration, Session, MIN_CONTENT_CHARS};
pub use samples::{find_sample, Sample, SAMPLE_LIBRARY};
pub use store::{filter_by_title, MemoryStore, SummaryStore, UserIdentity};
pub use types::{
    Character, DocumentType, SelectedFile, SummaryRecord, SummaryStyle, UploadState, WordCount,
    LANGUAGES,
};
