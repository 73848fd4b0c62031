use clap::{Parser, Subcommand};
use narrato_common::{DocumentType, SummaryStyle, LANGUAGES};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "narrato")]
#[command(about = "読解支援ツール: 要約・感情分析・翻訳・読み上げ", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// テキストを要約（ファイル or ライブラリのサンプル）
    Generate {
        /// 入力ファイル（複数指定時は先頭のみ使用）
        files: Vec<PathBuf>,

        /// サンプルID（`narrato samples` で一覧）
        #[arg(short, long, conflicts_with = "files")]
        sample: Option<u32>,

        /// 要約スタイル (short/medium/comprehensive)
        #[arg(long)]
        style: Option<SummaryStyle>,

        /// 文書の種類 (fiction/non-fiction/research/biography)
        #[arg(long = "type")]
        doc_type: Option<DocumentType>,

        /// タイトル（省略時はファイル名）
        #[arg(short, long)]
        title: Option<String>,

        /// 翻訳先の言語
        #[arg(short, long, value_parser = parse_language)]
        language: Option<String>,

        /// 結果JSONの出力先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// ライブラリに保存
        #[arg(long)]
        save: bool,

        /// 読めない形式でも警告文のまま送信する
        #[arg(long)]
        force: bool,
    },

    /// テキストを読み上げ（音声ファイルに保存）
    Speak {
        /// 読み上げるテキスト
        #[arg(required_unless_present = "id")]
        text: Option<String>,

        /// ライブラリの要約IDから読み上げ
        #[arg(long, conflicts_with = "text")]
        id: Option<String>,

        /// 翻訳文を読み上げ（--id 指定時）
        #[arg(long, requires = "id")]
        translated: bool,

        /// 音声ファイルの出力先（拡張子はMIMEタイプで決定）
        #[arg(short, long, default_value = "narration.wav")]
        output: PathBuf,

        /// 端末の読み上げコマンドへのフォールバックを無効化
        #[arg(long)]
        no_local_fallback: bool,
    },

    /// 組み込みサンプルの一覧
    Samples,

    /// 保存済みの要約
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// メモを表示/編集
    Notes {
        /// メモを上書き保存
        #[arg(long)]
        set: Option<String>,
    },

    /// 設定を表示/編集
    Config {
        /// APIのURLを設定
        #[arg(long)]
        set_api_url: Option<String>,

        /// ユーザーIDを設定
        #[arg(long)]
        set_user: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

#[derive(Subcommand)]
pub enum LibraryAction {
    /// 一覧（新しい順）
    List {
        /// タイトルで絞り込み
        #[arg(short, long)]
        search: Option<String>,
    },

    /// 要約を表示
    Show {
        id: String,

        /// JSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 要約本文を書き換え
    Edit { id: String, text: String },

    /// 削除
    Delete { id: String },
}

/// 対応言語のみ受け付ける（大文字小文字は無視）
pub fn parse_language(s: &str) -> Result<String, String> {
    LANGUAGES
        .iter()
        .find(|lang| lang.eq_ignore_ascii_case(s.trim()))
        .map(|lang| lang.to_string())
        .ok_or_else(|| format!("Unknown language: {}. Use one of: {}", s, LANGUAGES.join(", ")))
}
