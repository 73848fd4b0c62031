use crate::error::{NarratoError, Result};
use narrato_common::{ApiConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// API接続先を上書きする環境変数
pub const API_URL_ENV: &str = "NARRATO_API_URL";

pub const DEFAULT_USER_ID: &str = "local-user";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub user_id: String,
    pub timeout_seconds: u64,
    /// 要約ライブラリの保存先（未指定なら設定ディレクトリ）
    pub library_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.into(),
            user_id: DEFAULT_USER_ID.into(),
            timeout_seconds: 60,
            library_path: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| NarratoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("narrato"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn library_path(&self) -> Result<PathBuf> {
        match &self.library_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("library.json")),
        }
    }

    /// 接続先（環境変数を優先）
    pub fn api_url(&self) -> String {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url,
            _ => self.api_url.clone(),
        }
    }

    pub fn api(&self) -> ApiConfig {
        ApiConfig::new(self.api_url())
    }

    pub fn set_api_url(&mut self, url: String) -> Result<()> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(NarratoError::Config(format!(
                "APIのURLは http:// または https:// で始めてください: {}",
                url
            )));
        }
        self.api_url = url;
        self.save()
    }
}
