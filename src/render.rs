//! 要約結果のターミナル表示

use narrato_common::SummaryRecord;

const BAR_WIDTH: usize = 20;

/// 感情スコアを横棒で表示（0〜1にクランプ）
pub fn sentiment_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

/// 要約の全体を文字列化
pub fn render_summary(record: &SummaryRecord) -> String {
    let mut out = String::new();

    out.push_str(&format!("📖 {}\n", record.display_title()));
    if let Some(id) = &record.id {
        out.push_str(&format!("   ID: {}\n", id));
    }
    out.push('\n');

    out.push_str("■ 要約\n");
    out.push_str(&record.summary_text);
    out.push_str("\n\n");

    if record.has_translation() {
        out.push_str("■ 翻訳\n");
        out.push_str(record.translated_summary_text.as_deref().unwrap_or_default());
        out.push_str("\n\n");
    }

    out.push_str("■ 登場人物\n");
    if record.characters.is_empty() {
        out.push_str("  (No specific characters or entities were extracted.)\n");
    } else {
        for c in &record.characters {
            out.push_str(&format!("  - {}: {}\n", c.name, c.relation));
        }
    }
    out.push('\n');

    out.push_str("■ テーマ\n");
    if record.themes.is_empty() {
        out.push_str("  (No specific themes were extracted.)\n");
    } else {
        out.push_str(&format!("  {}\n", record.themes.join(" / ")));
    }
    out.push('\n');

    if !record.sentiment_scores.is_empty() {
        out.push_str("■ 感情推移\n");
        for (i, score) in record.sentiment_scores.iter().enumerate() {
            out.push_str(&format!("  §{:<2} {} {:.2}\n", i + 1, sentiment_bar(*score), score));
        }
        out.push('\n');
    }

    out.push_str(&render_insights(record));
    out
}

/// 数値サマリー
pub fn render_insights(record: &SummaryRecord) -> String {
    let mut out = String::from("■ インサイト\n");
    out.push_str(&format!("  信頼度: {}%\n", record.confidence_percent()));
    out.push_str(&format!(
        "  短縮できた読書時間: {}\n",
        record.reading_time_saved.as_deref().unwrap_or("N/A")
    ));
    if let Some(wc) = record.word_count {
        out.push_str(&format!("  語数: {} → {}\n", wc.original, wc.summary));
    }
    out
}

/// 一覧表示の1行
pub fn render_list_line(record: &SummaryRecord) -> String {
    let created = record
        .created_at
        .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        "{:<10} {:<16} {}",
        record.id.as_deref().unwrap_or("-"),
        created,
        record.display_title()
    )
}
