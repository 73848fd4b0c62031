//! 要約オプション（タイトル・種類・スタイル・翻訳言語）

use leptos::prelude::*;
use narrato_common::{DocumentType, Session, SummaryStyle, LANGUAGES};

#[component]
pub fn OptionsPanel(session: RwSignal<Session>) -> impl IntoView {
    view! {
        <div class="settings-panel">
            <div class="settings-grid">
                <div class="form-group">
                    <label for="title">"Title"</label>
                    <input
                        type="text"
                        id="title"
                        prop:value=move || session.with(|s| s.upload.title.clone())
                        on:input=move |ev| {
                            let title = event_target_value(&ev);
                            session.update(|s| s.upload.title = title);
                        }
                    />
                </div>

                <div class="form-group">
                    <label for="doc-type">"Document type"</label>
                    <select
                        id="doc-type"
                        on:change=move |ev| {
                            if let Ok(doc_type) = event_target_value(&ev).parse::<DocumentType>() {
                                session.update(|s| s.upload.declared_type = doc_type);
                            }
                        }
                    >
                        {DocumentType::ALL
                            .into_iter()
                            .map(|doc_type| view! {
                                <option
                                    value=doc_type.label()
                                    selected=move || session.with(|s| s.upload.declared_type == doc_type)
                                >
                                    {doc_type.label()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="form-group">
                    <label for="style">"Summary style"</label>
                    <select
                        id="style"
                        on:change=move |ev| {
                            if let Ok(style) = event_target_value(&ev).parse::<SummaryStyle>() {
                                session.update(|s| s.upload.summary_style = style);
                            }
                        }
                    >
                        {SummaryStyle::ALL
                            .into_iter()
                            .map(|style| view! {
                                <option
                                    value=style.label()
                                    selected=move || session.with(|s| s.upload.summary_style == style)
                                >
                                    {style.label()}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="form-group">
                    <label for="language">"Translate to"</label>
                    <select
                        id="language"
                        on:change=move |ev| {
                            let language = event_target_value(&ev);
                            session.update(|s| s.target_language = language);
                        }
                    >
                        {LANGUAGES
                            .into_iter()
                            .map(|lang| view! {
                                <option
                                    value=lang
                                    selected=move || session.with(|s| s.target_language == lang)
                                >
                                    {lang}
                                </option>
                            })
                            .collect_view()}
                    </select>
                </div>
            </div>
        </div>
    }
}
