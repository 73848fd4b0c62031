//! 要約結果・インサイト表示

use leptos::prelude::*;
use narrato_common::{Session, SummaryRecord};

#[component]
pub fn SummaryView<FL, FS, FV, FE>(
    session: RwSignal<Session>,
    speaking: ReadSignal<bool>,
    on_listen: FL,
    on_stop: FS,
    on_save: FV,
    on_edit: FE,
) -> impl IntoView
where
    FL: Fn(String) + 'static + Clone + Send + Sync,
    FS: Fn(()) + 'static + Clone + Send + Sync,
    FV: Fn(()) + 'static + Clone + Send + Sync,
    FE: Fn(String) + 'static + Clone + Send + Sync,
{
    move || {
        let record = session.with(|s| s.summary.clone())?;
        let on_listen = on_listen.clone();
        let on_stop = on_stop.clone();
        let on_save = on_save.clone();
        let on_edit = on_edit.clone();
        Some(view! {
            <SummaryCard
                record=record
                speaking=speaking
                on_listen=on_listen
                on_stop=on_stop
                on_save=on_save
                on_edit=on_edit
            />
        })
    }
}

#[component]
fn SummaryCard<FL, FS, FV, FE>(
    record: SummaryRecord,
    speaking: ReadSignal<bool>,
    on_listen: FL,
    on_stop: FS,
    on_save: FV,
    on_edit: FE,
) -> impl IntoView
where
    FL: Fn(String) + 'static + Clone + Send + Sync,
    FS: Fn(()) + 'static + Clone + Send + Sync,
    FV: Fn(()) + 'static + Clone + Send + Sync,
    FE: Fn(String) + 'static + Clone + Send + Sync,
{
    let summary_text = record.summary_text.clone();
    let translation = record
        .translated_summary_text
        .clone()
        .filter(|t| !t.trim().is_empty());
    let is_saved = record.id.is_some();

    let characters = if record.characters.is_empty() {
        view! { <p class="text-muted">"No specific characters or entities were extracted."</p> }.into_any()
    } else {
        view! {
            <ul class="characters">
                {record
                    .characters
                    .iter()
                    .map(|c| view! { <li><strong>{c.name.clone()}</strong>": "{c.relation.clone()}</li> })
                    .collect_view()}
            </ul>
        }
        .into_any()
    };

    let themes = if record.themes.is_empty() {
        view! { <p class="text-muted">"No specific themes were extracted."</p> }.into_any()
    } else {
        view! {
            <div class="themes">
                {record
                    .themes
                    .iter()
                    .map(|t| view! { <span class="tag">{t.clone()}</span> })
                    .collect_view()}
            </div>
        }
        .into_any()
    };

    let sentiment = record
        .sentiment_scores
        .iter()
        .enumerate()
        .map(|(i, score)| {
            let height = (score.clamp(0.0, 1.0) * 100.0).round();
            view! {
                <div
                    class="sentiment-bar"
                    title=format!("Section {}: {:.2}", i + 1, score)
                    style=format!("height: {}%", height)
                />
            }
        })
        .collect_view();

    let word_count = record
        .word_count
        .map(|wc| format!("{} → {}", wc.original, wc.summary))
        .unwrap_or_else(|| "N/A".to_string());

    view! {
        <section class="summary-view">
            <h2>{record.display_title().to_string()}</h2>

            <div class="summary-actions">
                <Show
                    when=move || speaking.get()
                    fallback={
                        let on_listen = on_listen.clone();
                        let text = summary_text.clone();
                        move || {
                            let on_listen = on_listen.clone();
                            let text = text.clone();
                            view! {
                                <button class="btn btn-secondary btn-small" on:click=move |_| on_listen(text.clone())>
                                    "🔊 Listen"
                                </button>
                            }
                        }
                    }
                >
                    <button
                        class="btn btn-secondary btn-small"
                        on:click={
                            let on_stop = on_stop.clone();
                            move |_| on_stop(())
                        }
                    >
                        "■ Stop"
                    </button>
                </Show>
                <button
                    class="btn btn-primary btn-small"
                    disabled=is_saved
                    on:click=move |_| on_save(())
                >
                    {if is_saved { "Saved" } else { "Save to library" }}
                </button>
            </div>

            <h3>"Summary"</h3>
            <textarea
                class="summary-text"
                prop:value=record.summary_text.clone()
                on:change=move |ev| on_edit(event_target_value(&ev))
            />

            {translation.map(|t| view! {
                <h3>"Translation"</h3>
                <p class="translation">{t}</p>
            })}

            <h3>"Characters"</h3>
            {characters}

            <h3>"Themes"</h3>
            {themes}

            <h3>"Sentiment"</h3>
            <div class="sentiment-chart">{sentiment}</div>

            <h3>"Insights"</h3>
            <dl class="insights">
                <dt>"Confidence"</dt>
                <dd>{format!("{}%", record.confidence_percent())}</dd>
                <dt>"Reading time saved"</dt>
                <dd>{record.reading_time_saved.clone().unwrap_or_else(|| "N/A".to_string())}</dd>
                <dt>"Word count"</dt>
                <dd>{word_count}</dd>
            </dl>

            <details class="original">
                <summary>"Original text"</summary>
                <p>{record.original_preview()}</p>
            </details>
        </section>
    }
}
