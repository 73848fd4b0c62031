//! 要約ライブラリ（ファイル保存）
//!
//! 共通ライブラリの MemoryStore をJSONファイルに書き出して永続化する。

use crate::error::{NarratoError, Result};
use narrato_common::MemoryStore;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// ライブラリファイルの構造
#[derive(Debug, Serialize, Deserialize)]
pub struct LibraryFile {
    /// バージョン（互換性チェック用）
    version: u32,
    store: MemoryStore,
}

/// 現在時刻（エポックミリ秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl LibraryFile {
    const CURRENT_VERSION: u32 = 1;

    /// ライブラリを読み込み
    ///
    /// ファイルが無いときだけ空のライブラリ。壊れている・バージョン違いの
    /// ファイルはエラーにして、上書き保存で消さないようにする
    pub fn load(path: &Path) -> Result<MemoryStore> {
        if !path.exists() {
            return Ok(MemoryStore::new(now_millis));
        }

        let unreadable = |reason: String| NarratoError::Library {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let reader = BufReader::new(file);
        let library = serde_json::from_reader::<_, LibraryFile>(reader).map_err(|e| {
            tracing::warn!("library {} is unreadable: {}", path.display(), e);
            unreadable(e.to_string())
        })?;

        // バージョンチェック
        if library.version != Self::CURRENT_VERSION {
            tracing::warn!(
                "library {} has version {}, expected {}",
                path.display(),
                library.version,
                Self::CURRENT_VERSION
            );
            return Err(unreadable(format!(
                "unsupported version {}",
                library.version
            )));
        }

        let mut store = library.store;
        store.set_clock(now_millis);
        Ok(store)
    }

    /// ライブラリを保存
    pub fn save(store: MemoryStore, path: &Path) -> Result<MemoryStore> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let library = LibraryFile {
            version: Self::CURRENT_VERSION,
            store,
        };
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &library)?;
        Ok(library.store)
    }
}
