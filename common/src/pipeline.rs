//! 要約生成パイプライン
//!
//! 1回のユーザー操作 = 1回の `/api/generate` 呼び出し（自動リトライなし）
//!
//! ```text
//! begin_generation  入力チェック → ローディング開始 → リクエスト作成
//!        ↓ (Transport::post_json)
//! finish_generation 古い応答の破棄 → デコード → SummaryRecord反映 / エラー表示
//! ```
//!
//! ブラウザでは状態をシグナルに置くため、await中に `&mut Session` を保持できない。
//! そのため開始と完了を分けて公開し、ネイティブ向けに [`generate`] でまとめる。

use crate::api::{ApiConfig, GenerateRequest, RawResponse, Transport, TransportError};
use crate::decoder::decode;
use crate::error::{Error, Result, GENERIC_GENERATION_FAILURE};
use crate::normalizer::{normalize_file, normalize_sample};
use crate::samples::Sample;
use crate::types::{SelectedFile, SummaryRecord, SummaryStyle, UploadState, DEFAULT_LANGUAGE};

/// 生成に必要な最小文字数
pub const MIN_CONTENT_CHARS: usize = 10;

/// タイトル未入力時にAPIへ送る名前
pub const DEFAULT_REQUEST_TITLE: &str = "Untitled";

/// 発行済みの生成リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct PendingGeneration {
    pub seq: u64,
    pub request: GenerateRequest,
}

impl PendingGeneration {
    pub fn body(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.request)?)
    }
}

/// セッション状態
///
/// アップロード入力・表示中の要約・エラーバナー・ローディングを1か所にまとめる
#[derive(Debug, Clone)]
pub struct Session {
    pub upload: UploadState,
    pub summary: Option<SummaryRecord>,
    /// バナーに表示するエラー文言
    pub error: Option<String>,
    pub is_loading: bool,
    pub target_language: String,
    latest_seq: u64,
    last_selection: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            upload: UploadState::default(),
            summary: None,
            error: None,
            is_loading: false,
            target_language: DEFAULT_LANGUAGE.to_string(),
            latest_seq: 0,
            last_selection: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// 生成ボタンを押せるか
    pub fn is_ready(&self) -> bool {
        self.upload.is_ready() && !self.is_loading
    }

    fn next_selection(&mut self) -> u64 {
        self.last_selection += 1;
        self.last_selection
    }

    /// ファイル選択
    ///
    /// 種類・スタイルの選択は引き継ぐ。読めない形式ならバナーに警告を出す。
    /// 戻り値はこの選択の番号で、読み込み結果の反映時に渡す
    pub fn select_file(&mut self, file: &SelectedFile) -> u64 {
        let mut upload = normalize_file(file);
        upload.declared_type = self.upload.declared_type;
        upload.summary_style = self.upload.summary_style;
        upload.selection = self.next_selection();

        self.error = upload.warning.clone();
        self.upload = upload;
        self.upload.selection
    }

    /// テキスト読み込み完了
    pub fn complete_extraction(&mut self, selection: u64, text: String) -> bool {
        self.upload.complete_extraction(selection, text)
    }

    /// テキスト読み込み失敗（バナーに表示）
    pub fn fail_extraction(&mut self, selection: u64, reason: &str) -> bool {
        match self.upload.fail_extraction(selection, reason) {
            Some(warning) => {
                self.error = Some(warning);
                true
            }
            None => false,
        }
    }

    /// サンプル選択（翻訳先は英語に戻す）
    pub fn select_sample(&mut self, sample: &Sample) {
        self.upload = normalize_sample(sample);
        self.upload.selection = self.next_selection();
        self.error = None;
        self.target_language = DEFAULT_LANGUAGE.to_string();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// 表示中の要約本文をローカル編集
    pub fn edit_summary_text(&mut self, text: impl Into<String>) -> Result<&SummaryRecord> {
        let summary = self
            .summary
            .as_mut()
            .ok_or_else(|| Error::NotFound("no summary to edit".into()))?;
        summary.summary_text = text.into();
        Ok(summary)
    }

    /// 生成開始
    ///
    /// 前回の要約は開始時点で消去し、失敗しても復元しない
    pub fn begin_generation(&mut self, style_override: Option<SummaryStyle>) -> Result<PendingGeneration> {
        self.error = None;
        self.summary = None;

        let content = &self.upload.content;
        if content.chars().count() < MIN_CONTENT_CHARS {
            let err = Error::InsufficientInput { min: MIN_CONTENT_CHARS };
            self.error = Some(err.banner_message());
            return Err(err);
        }

        let title = if self.upload.title.trim().is_empty() {
            DEFAULT_REQUEST_TITLE.to_string()
        } else {
            self.upload.title.clone()
        };
        let style = style_override.unwrap_or(self.upload.summary_style);
        let language = if self.target_language == DEFAULT_LANGUAGE {
            None
        } else {
            Some(self.target_language.clone())
        };

        self.latest_seq += 1;
        self.is_loading = true;

        tracing::debug!(
            "dispatching generation #{} ({} chars, style: {})",
            self.latest_seq,
            content.chars().count(),
            style
        );

        Ok(PendingGeneration {
            seq: self.latest_seq,
            request: GenerateRequest {
                text: content.clone(),
                title,
                style: style.label().to_string(),
                language,
            },
        })
    }

    /// 生成完了
    ///
    /// 最後に発行したリクエスト以外の応答は破棄し、状態を変更しない
    pub fn finish_generation(
        &mut self,
        pending: PendingGeneration,
        outcome: std::result::Result<RawResponse, TransportError>,
    ) -> Result<SummaryRecord> {
        if pending.seq != self.latest_seq {
            tracing::warn!(
                "discarding response for generation #{} (latest is #{})",
                pending.seq,
                self.latest_seq
            );
            return Err(Error::Superseded {
                seq: pending.seq,
                latest: self.latest_seq,
            });
        }

        self.is_loading = false;

        match interpret_response(outcome) {
            Ok(record) => {
                self.summary = Some(record.clone());
                Ok(record)
            }
            Err(err) => {
                tracing::warn!("generation #{} failed: {}", pending.seq, err);
                self.error = Some(err.banner_message());
                Err(err)
            }
        }
    }
}

/// レスポンスを `SummaryRecord` に変換
fn interpret_response(
    outcome: std::result::Result<RawResponse, TransportError>,
) -> Result<SummaryRecord> {
    let response = outcome.map_err(|e| Error::Network(e.0))?;
    let decoded = decode(response.content_type.as_deref(), &response.body);

    if !response.is_success() {
        let message = decoded
            .ok()
            .as_ref()
            .and_then(|v| v.get("error"))
            .and_then(|v| v.as_str())
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| GENERIC_GENERATION_FAILURE.to_string());
        return Err(Error::generation_failed(message));
    }

    let value = decoded.map_err(|e| {
        tracing::warn!("undecodable generate response (status {}): {}", response.status, e.snippet);
        Error::GenerationFailed {
            message: GENERIC_GENERATION_FAILURE.to_string(),
            source: Some(e),
        }
    })?;

    serde_json::from_value::<SummaryRecord>(value)
        .map_err(|e| Error::generation_failed(format!("Malformed summary response: {}", e)))
}

/// 要約を1回生成
pub async fn generate<T: Transport>(
    session: &mut Session,
    transport: &T,
    config: &ApiConfig,
    style_override: Option<SummaryStyle>,
) -> Result<SummaryRecord> {
    let pending = session.begin_generation(style_override)?;
    let body = match pending.body() {
        Ok(body) => body,
        Err(err) => {
            session.is_loading = false;
            session.error = Some(err.banner_message());
            return Err(err);
        }
    };

    let outcome = transport.post_json(&config.generate_url(), body).await;
    session.finish_generation(pending, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::find_sample;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    /// 呼び出し回数と送信ボディを記録するモック
    struct MockTransport {
        response: std::result::Result<RawResponse, TransportError>,
        calls: Cell<usize>,
        last_url: RefCell<Option<String>>,
        last_body: RefCell<Option<String>>,
    }

    impl MockTransport {
        fn json(status: u16, body: serde_json::Value) -> Self {
            Self::raw(status, Some("application/json"), &body.to_string())
        }

        fn raw(status: u16, content_type: Option<&str>, body: &str) -> Self {
            Self {
                response: Ok(RawResponse {
                    status,
                    content_type: content_type.map(str::to_string),
                    body: body.to_string(),
                }),
                calls: Cell::new(0),
                last_url: RefCell::new(None),
                last_body: RefCell::new(None),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                response: Err(TransportError(message.to_string())),
                calls: Cell::new(0),
                last_url: RefCell::new(None),
                last_body: RefCell::new(None),
            }
        }
    }

    impl Transport for MockTransport {
        async fn post_json(&self, url: &str, body: String) -> std::result::Result<RawResponse, TransportError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_url.borrow_mut() = Some(url.to_string());
            *self.last_body.borrow_mut() = Some(body);
            self.response.clone()
        }
    }

    fn session_with_text(text: &str) -> Session {
        let mut session = Session::new();
        session.upload.content = text.to_string();
        session.upload.title = "Notes".to_string();
        session
    }

    // =============================================
    // 入力チェック
    // =============================================

    #[test]
    fn test_generate_short_content_makes_no_request() {
        let transport = MockTransport::json(200, json!({"summaryText": "X"}));
        let mut session = session_with_text("abc");

        let result = block_on(generate(&mut session, &transport, &ApiConfig::default(), None));

        assert!(matches!(result, Err(Error::InsufficientInput { min: 10 })));
        assert_eq!(transport.calls.get(), 0);
        assert!(!session.is_loading);
        assert_eq!(session.error.as_deref(), Some("Please provide enough text to summarize."));
    }

    #[test]
    fn test_generate_empty_content_makes_no_request() {
        let transport = MockTransport::json(200, json!({"summaryText": "X"}));
        let mut session = Session::new();

        let result = block_on(generate(&mut session, &transport, &ApiConfig::default(), None));
        assert!(matches!(result, Err(Error::InsufficientInput { .. })));
        assert_eq!(transport.calls.get(), 0);
    }

    // =============================================
    // 正常系
    // =============================================

    #[test]
    fn test_generate_success() {
        let transport = MockTransport::json(
            200,
            json!({"summaryText": "X", "wordCount": {"original": 100, "summary": 10}}),
        );
        let mut session = session_with_text("A long enough piece of text.");

        let record = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap();

        assert_eq!(record.summary_text, "X");
        assert_eq!(record.word_count.unwrap().original, 100);
        assert_eq!(session.summary.as_ref().unwrap().summary_text, "X");
        assert!(!session.is_loading);
        assert!(session.error.is_none());
        assert_eq!(transport.calls.get(), 1);
        assert_eq!(
            transport.last_url.borrow().as_deref(),
            Some("http://localhost:4000/api/generate")
        );
    }

    #[test]
    fn test_generate_request_body() {
        let transport = MockTransport::json(200, json!({"summaryText": "X"}));
        let mut session = session_with_text("A long enough piece of text.");
        session.upload.title = String::new();
        session.upload.summary_style = SummaryStyle::MediumSummary;

        block_on(generate(
            &mut session,
            &transport,
            &ApiConfig::default(),
            Some(SummaryStyle::ShortAbstract),
        ))
        .unwrap();

        let body: serde_json::Value =
            serde_json::from_str(transport.last_body.borrow().as_deref().unwrap()).unwrap();
        assert_eq!(
            body,
            json!({
                "text": "A long enough piece of text.",
                "title": "Untitled",
                "style": "Short Abstract (100 words)"
            })
        );
    }

    #[test]
    fn test_generate_sends_language_for_translation() {
        let transport = MockTransport::json(200, json!({"summaryText": "X", "translatedSummary": "Y"}));
        let mut session = session_with_text("A long enough piece of text.");
        session.target_language = "Spanish".to_string();

        let record = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap();

        let body: serde_json::Value =
            serde_json::from_str(transport.last_body.borrow().as_deref().unwrap()).unwrap();
        assert_eq!(body["language"], "Spanish");
        assert_eq!(body["style"], "Comprehensive (Max Length)");
        assert_eq!(record.translated_summary_text.as_deref(), Some("Y"));
    }

    #[test]
    fn test_generate_response_with_both_summary_keys() {
        let transport = MockTransport::json(
            200,
            json!({"summary": "legacy", "summaryText": "X", "characters": null, "sentimentScores": null}),
        );
        let mut session = session_with_text("A long enough piece of text.");

        let record = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap();

        assert_eq!(record.summary_text, "X");
        assert_eq!(record.extra["summary"], "legacy");
        assert!(record.characters.is_empty());
        assert!(record.sentiment_scores.is_empty());
        assert!(session.error.is_none());
    }

    // =============================================
    // 異常系
    // =============================================

    #[test]
    fn test_generate_server_error_message() {
        let transport = MockTransport::json(500, json!({"error": "overloaded"}));
        let mut session = session_with_text("A long enough piece of text.");
        session.summary = Some(SummaryRecord {
            summary_text: "previous".into(),
            ..Default::default()
        });

        let err = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap_err();

        match err {
            Error::GenerationFailed { message, .. } => assert_eq!(message, "overloaded"),
            other => panic!("Expected GenerationFailed, got {:?}", other),
        }
        // 前回の要約は開始時に消去され、復元されない
        assert!(session.summary.is_none());
        assert_eq!(session.error.as_deref(), Some("Error: overloaded"));
        assert!(!session.is_loading);
    }

    #[test]
    fn test_generate_server_error_without_message() {
        let transport = MockTransport::raw(502, Some("text/html"), "<html><body>Bad Gateway</body></html>");
        let mut session = session_with_text("A long enough piece of text.");

        let err = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap_err();
        assert_eq!(err.to_string(), "Summary generation failed");
    }

    #[test]
    fn test_generate_html_body_with_ok_status() {
        let transport = MockTransport::raw(200, Some("text/html"), "<!DOCTYPE html><html>login</html>");
        let mut session = session_with_text("A long enough piece of text.");

        let err = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap_err();

        match err {
            Error::GenerationFailed { message, source } => {
                assert_eq!(message, "Summary generation failed");
                assert!(source.unwrap().snippet.contains("login"));
            }
            other => panic!("Expected GenerationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_generate_missing_summary_text() {
        let transport = MockTransport::json(200, json!({"themes": ["war"]}));
        let mut session = session_with_text("A long enough piece of text.");

        let err = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap_err();
        assert!(err.to_string().contains("Malformed summary response"));
        assert!(session.summary.is_none());
    }

    #[test]
    fn test_generate_network_error() {
        let transport = MockTransport::failing("connection refused");
        let mut session = session_with_text("A long enough piece of text.");

        let err = block_on(generate(&mut session, &transport, &ApiConfig::default(), None)).unwrap_err();

        assert!(matches!(err, Error::Network(ref m) if m == "connection refused"));
        assert_eq!(transport.calls.get(), 1);
        assert_eq!(session.error.as_deref(), Some("Error: connection refused"));
        assert!(!session.is_loading);
    }

    // =============================================
    // 古い応答の破棄
    // =============================================

    #[test]
    fn test_stale_response_is_discarded() {
        let mut session = session_with_text("A long enough piece of text.");

        let first = session.begin_generation(None).unwrap();
        let second = session.begin_generation(None).unwrap();
        assert!(second.seq > first.seq);

        let ok = |text: &str| {
            Ok(RawResponse {
                status: 200,
                content_type: Some("application/json".into()),
                body: json!({ "summaryText": text }).to_string(),
            })
        };

        let record = session.finish_generation(second, ok("fresh")).unwrap();
        assert_eq!(record.summary_text, "fresh");

        let stale = session.finish_generation(first, ok("stale"));
        assert!(matches!(stale, Err(Error::Superseded { seq: 1, latest: 2 })));
        assert_eq!(session.summary.as_ref().unwrap().summary_text, "fresh");
        assert!(session.error.is_none());
    }

    #[test]
    fn test_stale_response_keeps_loading_for_latest() {
        let mut session = session_with_text("A long enough piece of text.");

        let first = session.begin_generation(None).unwrap();
        let _second = session.begin_generation(None).unwrap();

        let stale = session.finish_generation(first, Err(TransportError("timeout".into())));
        assert!(matches!(stale, Err(Error::Superseded { .. })));
        assert!(session.is_loading);
        assert!(session.error.is_none());
    }

    // =============================================
    // 入力選択
    // =============================================

    #[test]
    fn test_select_file_keeps_style_and_sets_warning() {
        let mut session = Session::new();
        session.upload.summary_style = SummaryStyle::ShortAbstract;

        session.select_file(&SelectedFile::new("scan.pdf", 10));

        assert_eq!(session.upload.summary_style, SummaryStyle::ShortAbstract);
        assert!(session.error.as_deref().unwrap().contains("scan.pdf"));
        assert!(!session.is_ready());
    }

    #[test]
    fn test_reselecting_same_name_discards_earlier_read() {
        let mut session = Session::new();
        let first = session.select_file(&SelectedFile::new("notes.txt", 10));
        let second = session.select_file(&SelectedFile::new("notes.txt", 20));
        assert_ne!(first, second);

        assert!(!session.complete_extraction(first, "old contents".into()));
        assert!(session.upload.content.is_empty());

        assert!(session.complete_extraction(second, "new contents".into()));
        assert_eq!(session.upload.content, "new contents");
    }

    #[test]
    fn test_failed_read_shows_banner() {
        let mut session = Session::new();
        let selection = session.select_file(&SelectedFile::new("notes.txt", 10));
        assert!(session.upload.extraction_pending);

        assert!(session.fail_extraction(selection, "file could not be read"));

        assert!(!session.upload.extraction_pending);
        assert_eq!(
            session.error.as_deref(),
            Some("Could not read notes.txt: file could not be read")
        );
        assert!(!session.is_ready());

        // 選び直せば読み込み待ちに戻る
        let retry = session.select_file(&SelectedFile::new("notes.txt", 10));
        assert!(session.error.is_none());
        assert!(session.complete_extraction(retry, "Some readable text".into()));
        assert!(session.is_ready());
    }

    #[test]
    fn test_select_sample_resets_language() {
        let mut session = Session::new();
        session.target_language = "French".into();
        session.error = Some("old".into());

        session.select_sample(find_sample(103).unwrap());

        assert_eq!(session.target_language, "English");
        assert!(session.error.is_none());
        assert!(session.is_ready());
    }

    #[test]
    fn test_edit_summary_text() {
        let mut session = Session::new();
        assert!(session.edit_summary_text("x").is_err());

        session.summary = Some(SummaryRecord {
            summary_text: "before".into(),
            ..Default::default()
        });
        session.edit_summary_text("after").unwrap();
        assert_eq!(session.summary.unwrap().summary_text, "after");
    }
}
