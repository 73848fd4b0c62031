//! 入力ファイルの読み込み
//!
//! ファイル選択 → 正規化 → （テキストなら）非同期読み込み、の順で Session に反映する

use crate::error::{NarratoError, Result};
use narrato_common::{SelectedFile, Session};
use std::path::{Path, PathBuf};

/// パスから選択ファイル情報を作る
pub fn selected_file(path: &Path) -> Result<SelectedFile> {
    if !path.is_file() {
        return Err(NarratoError::FileNotFound(path.display().to_string()));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let size = std::fs::metadata(path)?.len();
    Ok(SelectedFile::new(name, size))
}

/// ファイルを選択して本文を読み込む
///
/// 複数指定された場合は先頭のみ使用（残りは存在確認もしない）
pub async fn load_into_session(session: &mut Session, paths: &[PathBuf]) -> Result<()> {
    let Some((path, rest)) = paths.split_first() else {
        return Err(NarratoError::MissingInput);
    };
    let file = selected_file(path)?;
    if !rest.is_empty() {
        tracing::warn!("{} files given, only {} is used", paths.len(), file.name);
    }

    let selection = session.select_file(&file);

    if session.upload.extraction_pending {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                tracing::debug!("read {} chars from {}", text.chars().count(), path.display());
                session.complete_extraction(selection, text);
            }
            Err(e) => {
                session.fail_extraction(selection, &e.to_string());
                return Err(e.into());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Call me Ishmael. Some years ago...").unwrap();

        let mut session = Session::new();
        load_into_session(&mut session, &[path]).await.unwrap();

        assert_eq!(session.upload.title, "notes");
        assert!(session.upload.content.starts_with("Call me Ishmael"));
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_load_pdf_sets_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let mut session = Session::new();
        load_into_session(&mut session, &[path]).await.unwrap();

        assert!(session.upload.warning.is_some());
        assert!(session.upload.content.contains("scan.pdf"));
        assert!(!session.is_ready());
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let mut session = Session::new();
        let err = load_into_session(&mut session, &[PathBuf::from("/nonexistent/narrato.txt")])
            .await
            .unwrap_err();
        assert!(matches!(err, NarratoError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_extra_paths_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Call me Ishmael. Some years ago...").unwrap();

        let mut session = Session::new();
        load_into_session(&mut session, &[path, dir.path().join("missing.txt")])
            .await
            .unwrap();

        assert_eq!(session.upload.title, "notes");
        assert!(session.is_ready());
    }

    #[tokio::test]
    async fn test_no_paths_is_missing_input() {
        let mut session = Session::new();
        let err = load_into_session(&mut session, &[]).await.unwrap_err();
        assert!(matches!(err, NarratoError::MissingInput));
    }
}
