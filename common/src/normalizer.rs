//! 入力正規化
//!
//! ファイル選択・ドラッグ&ドロップ・サンプル選択をすべて `UploadState` に変換する。
//! プレーンテキスト以外はクライアント側で本文を取り出せないため、
//! 警告付きのプレースホルダー本文を入れる。

use crate::samples::Sample;
use crate::types::{SelectedFile, SummaryStyle, UploadState, UNTITLED_DOCUMENT};

/// クライアント側で読み込めるテキスト拡張子
pub const PLAIN_TEXT_EXTENSIONS: [&str; 3] = ["txt", "text", "md"];

/// ファイル名から最後の拡張子を取り除く
///
/// 拡張子が無い場合はファイル名そのまま、結果が空ならプレースホルダー。
/// `"README"` は `"Untitled Document"` ではなく `"README"` になる（意図的。
/// 拡張子の無い名前もタイトルとして使えるので、プレースホルダーは `".txt"`
/// のように語幹が空のときだけ）
pub fn title_from_file_name(name: &str) -> String {
    let stem = match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    };

    if stem.trim().is_empty() {
        UNTITLED_DOCUMENT.to_string()
    } else {
        stem.to_string()
    }
}

/// プレーンテキストとして読めるか
pub fn is_plain_text(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 読めないファイル用のプレースホルダー本文
pub fn unsupported_placeholder(name: &str) -> String {
    format!(
        "(Warning: The file \"{}\" is a PDF, EPUB or other rich document. Accurate summarization requires the full text content. Please use a plain .TXT file or select a book from the Library for a correct analysis. The AI will summarize this warning text.)",
        name
    )
}

/// 読めないファイル用の警告文
pub fn unsupported_warning(name: &str) -> String {
    format!(
        "Cannot process {}. Only .TXT files can be read client-side for accurate summarization. Please convert your file or use the library.",
        name
    )
}

/// 選択されたファイルを正規化
///
/// テキストファイルは本文が空のまま `extraction_pending` を立てる。
/// 読み込み完了は [`UploadState::complete_extraction`] で反映する。
pub fn normalize_file(file: &SelectedFile) -> UploadState {
    let title = title_from_file_name(&file.name);

    if is_plain_text(&file.name) {
        UploadState {
            source_file: Some(file.clone()),
            title,
            extraction_pending: true,
            ..Default::default()
        }
    } else {
        tracing::warn!("{} cannot be read client-side, using placeholder text", file.name);
        UploadState {
            source_file: Some(file.clone()),
            title,
            content: unsupported_placeholder(&file.name),
            warning: Some(unsupported_warning(&file.name)),
            ..Default::default()
        }
    }
}

/// サンプルを正規化（読み込み不要、即座にready）
pub fn normalize_sample(sample: &Sample) -> UploadState {
    UploadState {
        source_file: None,
        title: sample.title.to_string(),
        declared_type: sample.doc_type,
        summary_style: SummaryStyle::Comprehensive,
        content: sample.content.to_string(),
        warning: None,
        extraction_pending: false,
        selection: 0,
    }
}

/// 複数ファイルのドロップ/選択は先頭のみ使う
pub fn first_file(files: &[SelectedFile]) -> Option<&SelectedFile> {
    if files.len() > 1 {
        tracing::debug!("{} files selected, using only the first", files.len());
    }
    files.first()
}
