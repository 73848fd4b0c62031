use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarratoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("入力がありません。ファイルを指定するか `--sample <ID>` でライブラリから選んでください")]
    MissingInput,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("{0}")]
    UnsupportedFile(String),

    #[error("ライブラリを読み込めません: {path}（{reason}）。ファイルを修復するか移動してから再実行してください")]
    Library { path: String, reason: String },

    #[error("サンプルが見つかりません: {0}（`narrato samples` で一覧表示）")]
    UnknownSample(u32),

    #[error("HTTPクライアントエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("対話入力エラー: {0}")]
    Prompt(String),

    #[error(transparent)]
    Common(#[from] narrato_common::Error),
}

impl From<dialoguer::Error> for NarratoError {
    fn from(err: dialoguer::Error) -> Self {
        NarratoError::Prompt(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NarratoError>;
