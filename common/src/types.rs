//! データモデル
//!
//! CLIとWeb(WASM)で共有される型:
//! - UploadState: アップロード中の入力（ファイル or ライブラリ）
//! - SummaryRecord: 要約APIの結果（保存時にid/createdAtが付く）

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// タイトルが得られないときのアップロード名
pub const UNTITLED_DOCUMENT: &str = "Untitled Document";

/// 要約結果のタイトルが無いときの表示名
pub const UNTITLED_BOOK: &str = "Untitled Book";

/// 原文プレビューの文字数
pub const PREVIEW_CHARS: usize = 500;

/// 翻訳先の言語
pub const LANGUAGES: [&str; 8] = [
    "English",
    "Hindi",
    "Spanish",
    "French",
    "German",
    "Japanese",
    "Russian",
    "Mandarin (Simplified)",
];

pub const DEFAULT_LANGUAGE: &str = "English";

/// 文書の種類
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentType {
    Fiction,
    #[default]
    #[serde(rename = "Non-fiction")]
    NonFiction,
    Research,
    Biography,
}

impl DocumentType {
    pub const ALL: [DocumentType; 4] = [
        DocumentType::Fiction,
        DocumentType::NonFiction,
        DocumentType::Research,
        DocumentType::Biography,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::Fiction => "Fiction",
            DocumentType::NonFiction => "Non-fiction",
            DocumentType::Research => "Research",
            DocumentType::Biography => "Biography",
        }
    }
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fiction" => Ok(DocumentType::Fiction),
            "non-fiction" | "nonfiction" => Ok(DocumentType::NonFiction),
            "research" => Ok(DocumentType::Research),
            "biography" => Ok(DocumentType::Biography),
            _ => Err(format!(
                "Unknown type: {}. Use fiction, non-fiction, research, or biography",
                s
            )),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 要約スタイル
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryStyle {
    #[serde(rename = "Short Abstract (100 words)")]
    ShortAbstract,
    #[serde(rename = "Medium Summary (1 page)")]
    MediumSummary,
    #[default]
    #[serde(rename = "Comprehensive (Max Length)")]
    Comprehensive,
}

impl SummaryStyle {
    pub const ALL: [SummaryStyle; 3] = [
        SummaryStyle::ShortAbstract,
        SummaryStyle::MediumSummary,
        SummaryStyle::Comprehensive,
    ];

    /// APIに送る表記
    pub fn label(&self) -> &'static str {
        match self {
            SummaryStyle::ShortAbstract => "Short Abstract (100 words)",
            SummaryStyle::MediumSummary => "Medium Summary (1 page)",
            SummaryStyle::Comprehensive => "Comprehensive (Max Length)",
        }
    }
}

impl std::str::FromStr for SummaryStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short" | "abstract" | "short abstract (100 words)" => Ok(SummaryStyle::ShortAbstract),
            "medium" | "medium summary (1 page)" => Ok(SummaryStyle::MediumSummary),
            "comprehensive" | "full" | "comprehensive (max length)" => {
                Ok(SummaryStyle::Comprehensive)
            }
            _ => Err(format!(
                "Unknown style: {}. Use short, medium, or comprehensive",
                s
            )),
        }
    }
}

impl std::fmt::Display for SummaryStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// ユーザーが選択したファイル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// アップロード状態
///
/// 新しいファイル/サンプルを選ぶたびに丸ごと置き換える
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadState {
    /// ライブラリのサンプル使用時はNone
    pub source_file: Option<SelectedFile>,
    pub title: String,
    pub declared_type: DocumentType,
    pub summary_style: SummaryStyle,
    /// 送信するテキスト（抽出完了までは空）
    pub content: String,
    /// クライアント側で読めない形式のときにセット
    pub warning: Option<String>,
    /// テキスト読み込み待ち
    pub extraction_pending: bool,
    /// 選択ごとの番号（読み込み結果の照合用）
    #[serde(default)]
    pub selection: u64,
}

impl UploadState {
    /// 生成を開始できるか
    pub fn is_ready(&self) -> bool {
        !self.content.is_empty() && self.warning.is_none() && !self.extraction_pending
    }

    /// `selection` の読み込みがまだ待ち状態か
    fn awaits(&self, selection: u64) -> bool {
        self.extraction_pending && self.selection == selection
    }

    /// 非同期のテキスト読み込み完了を反映
    ///
    /// 読み込み中に別のファイル（同名でも）が選ばれていた場合は何もしない
    pub fn complete_extraction(&mut self, selection: u64, text: String) -> bool {
        if !self.awaits(selection) {
            tracing::debug!("ignoring stale extraction result for selection {}", selection);
            return false;
        }

        self.content = text;
        self.extraction_pending = false;
        true
    }

    /// 読み込み失敗を反映
    ///
    /// 待ち状態を解除して警告をセットする。古い選択の失敗は無視
    pub fn fail_extraction(&mut self, selection: u64, reason: &str) -> Option<String> {
        if !self.awaits(selection) {
            return None;
        }

        let name = self
            .source_file
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or(UNTITLED_DOCUMENT);
        let warning = format!("Could not read {}: {}", name, reason);
        self.extraction_pending = false;
        self.warning = Some(warning.clone());
        Some(warning)
    }
}

/// 登場人物
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    pub name: String,
    pub relation: String,
}

/// 語数（原文/要約）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WordCount {
    pub original: u64,
    pub summary: u64,
}

/// 要約結果
///
/// サーバーのレスポンスをそのまま採用する。未知のフィールドは `extra` に保持し、
/// 保存・再シリアライズ時にも落とさない。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SummaryRecordWire")]
pub struct SummaryRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,

    pub summary_text: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_summary_text: Option<String>,

    pub characters: Vec<Character>,

    pub themes: Vec<String>,

    /// セクションごとの感情スコア (0〜1)
    pub sentiment_scores: Vec<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<WordCount>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time_saved: Option<String>,

    /// 保存時刻（エポックミリ秒、ストアが付与）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 受信時の形
///
/// 旧名 `summary` / `translatedSummary` は `extra` 側に入る。
/// 新名が無いときだけそちらを採用する。
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryRecordWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    original_text: Option<String>,
    #[serde(default)]
    summary_text: Option<String>,
    #[serde(default)]
    translated_summary_text: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    characters: Vec<Character>,
    #[serde(default, deserialize_with = "null_as_empty")]
    themes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    sentiment_scores: Vec<f64>,
    #[serde(default)]
    word_count: Option<WordCount>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reading_time_saved: Option<String>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// `null` を空リストとして読む
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// 旧名のキーが文字列ならextraから取り出す
fn take_legacy_text(extra: &mut Map<String, Value>, key: &str) -> Option<String> {
    match extra.get(key) {
        Some(Value::String(_)) => match extra.remove(key) {
            Some(Value::String(text)) => Some(text),
            _ => None,
        },
        _ => None,
    }
}

impl TryFrom<SummaryRecordWire> for SummaryRecord {
    type Error = String;

    fn try_from(mut wire: SummaryRecordWire) -> Result<Self, Self::Error> {
        let summary_text = match wire.summary_text {
            Some(text) => text,
            None => take_legacy_text(&mut wire.extra, "summary")
                .ok_or_else(|| "missing field `summaryText`".to_string())?,
        };

        let translated_summary_text = match wire.translated_summary_text {
            Some(text) => Some(text),
            None => take_legacy_text(&mut wire.extra, "translatedSummary"),
        };

        Ok(Self {
            id: wire.id,
            title: wire.title,
            original_text: wire.original_text,
            summary_text,
            translated_summary_text,
            characters: wire.characters,
            themes: wire.themes,
            sentiment_scores: wire.sentiment_scores,
            word_count: wire.word_count,
            confidence: wire.confidence,
            reading_time_saved: wire.reading_time_saved,
            created_at: wire.created_at,
            user_id: wire.user_id,
            extra: wire.extra,
        })
    }
}

impl SummaryRecord {
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => UNTITLED_BOOK,
        }
    }

    /// 原文の先頭プレビュー
    pub fn original_preview(&self) -> String {
        self.original_text
            .as_deref()
            .unwrap_or_default()
            .chars()
            .take(PREVIEW_CHARS)
            .collect()
    }

    /// 信頼度（%）。未設定時は95%表示
    pub fn confidence_percent(&self) -> u32 {
        (self.confidence.unwrap_or(0.95).clamp(0.0, 1.0) * 100.0).round() as u32
    }

    pub fn has_translation(&self) -> bool {
        self.translated_summary_text
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}
