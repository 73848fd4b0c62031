//! メインアプリケーションコンポーネント

use crate::api::{api_config, FetchTransport};
use crate::audio::BrowserAudioSink;
use crate::components::{
    header::Header,
    loading::Loading,
    options_panel::OptionsPanel,
    sample_picker::SamplePicker,
    saved_list::SavedList,
    summary_view::SummaryView,
    upload_area::UploadArea,
};
use crate::storage;
use leptos::prelude::*;
use leptos::task::spawn_local;
use narrato_common::api::TtsRequest;
use narrato_common::{
    Narrator, Playback, Session, SummaryRecord, SummaryStore, Transport, TransportError,
    UserIdentity,
};

/// ログイン機能は持たないので固定のユーザー
const LOCAL_USER: &str = "local-user";

fn log_warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let identity = UserIdentity::new(LOCAL_USER);
    let session = RwSignal::new(Session::new());
    let (speaking, set_speaking) = signal(false);
    let (saved, set_saved) = signal(Vec::<SummaryRecord>::new());

    // 保存済み要約（変更のたびにスナップショットが届く）
    let library = StoredValue::new_local(storage::load_library());
    {
        let user_id = identity.user_id.clone();
        library.update_value(|store| {
            store.subscribe(&user_id, Box::new(move |snapshot| set_saved.set(snapshot.to_vec())));
        });
    }

    let persist = move |store: &narrato_common::MemoryStore| {
        if let Err(e) = storage::save_library(store) {
            log_warn(&e);
        }
    };

    // 読み上げ（同時再生は1つ）
    let narrator = StoredValue::new_local(Narrator::new(BrowserAudioSink::new(move || {
        set_speaking.set(false)
    })));
    Effect::new(move |_| {
        if !speaking.get() {
            narrator.update_value(|n| n.playback_ended());
        }
    });

    // 要約生成
    let on_generate = move |_: leptos::ev::MouseEvent| {
        let mut begun = None;
        session.update(|s| begun = Some(s.begin_generation(None)));
        let Some(Ok(pending)) = begun else {
            return;
        };

        let body = match pending.body() {
            Ok(body) => body,
            Err(e) => {
                session.update(|s| {
                    s.is_loading = false;
                    s.error = Some(e.banner_message());
                });
                return;
            }
        };

        let url = api_config().generate_url();
        spawn_local(async move {
            let outcome = FetchTransport.post_json(&url, body).await;
            session.update(|s| {
                // 古いリクエストの応答や失敗はセッション側で処理済み
                if let Err(e) = s.finish_generation(pending, outcome) {
                    log_warn(&e.to_string());
                }
            });
        });
    };

    let on_listen = move |text: String| {
        let mut started = None;
        narrator.update_value(|n| started = n.start(&text));
        let Some(seq) = started else {
            return;
        };
        set_speaking.set(true);

        let url = api_config().tts_url();
        spawn_local(async move {
            let outcome = match serde_json::to_string(&TtsRequest { text: &text }) {
                Ok(body) => FetchTransport.post_json(&url, body).await,
                Err(e) => Err(TransportError(e.to_string())),
            };

            let mut playback = Playback::Discarded;
            narrator.update_value(|n| playback = n.finish(seq, &text, outcome));
            match playback {
                Playback::Remote => {}
                // 停止済みか、新しい読み上げに置き換わっている
                Playback::Discarded => {}
                Playback::LocalFallback | Playback::Silent => set_speaking.set(false),
            }
        });
    };

    let on_stop = move |_: ()| {
        narrator.update_value(|n| n.stop());
        set_speaking.set(false);
    };

    let on_save = {
        let user_id = identity.user_id.clone();
        move |_: ()| {
            let Some(record) = session.with(|s| s.summary.clone()) else {
                return;
            };

            let mut added = None;
            library.update_value(|store| {
                added = Some(store.add_summary(&user_id, record));
                persist(store);
            });

            match added {
                Some(Ok(id)) => session.update(|s| {
                    if let Some(summary) = s.summary.as_mut() {
                        summary.id = Some(id);
                    }
                }),
                Some(Err(e)) => session.update(|s| s.error = Some(e.banner_message())),
                None => {}
            }
        }
    };

    let on_edit = move |text: String| {
        let mut saved_id = None;
        session.update(|s| {
            if let Ok(record) = s.edit_summary_text(text.clone()) {
                saved_id = record.id.clone();
            }
        });

        // ライブラリ保存済みなら保存先も更新
        if let Some(id) = saved_id {
            library.update_value(|store| {
                match store.update_summary(&id, serde_json::json!({ "summaryText": text })) {
                    Ok(_) => persist(store),
                    Err(e) => log_warn(&e.to_string()),
                }
            });
        }
    };

    let on_open = move |id: String| {
        let record = library.with_value(|store| store.get_summary(&id));
        if let Some(record) = record {
            session.update(|s| {
                s.summary = Some(record);
                s.clear_error();
            });
        }
    };

    let on_delete = move |id: String| {
        library.update_value(|store| {
            match store.delete_summary(&id) {
                Ok(()) => persist(store),
                Err(e) => log_warn(&e.to_string()),
            }
        });
    };

    let upload_summary = move || {
        session.with(|s| {
            if s.upload.content.is_empty() {
                None
            } else {
                Some(format!(
                    "{} · {} · {} characters",
                    s.upload.title,
                    s.upload.declared_type,
                    s.upload.content.chars().count()
                ))
            }
        })
    };

    view! {
        <div class="container">
            <Header />

            <Show when=move || session.with(|s| s.error.is_some())>
                <div class="error-banner">
                    <span>{move || session.with(|s| s.error.clone())}</span>
                    <button class="btn btn-tertiary btn-small" on:click=move |_| session.update(|s| s.clear_error())>
                        "×"
                    </button>
                </div>
            </Show>

            <div class="input-grid">
                <UploadArea session=session />
                <SamplePicker session=session />
            </div>

            <p class="text-muted">{upload_summary}</p>

            <OptionsPanel session=session />

            <div class="generate-buttons">
                <button
                    class="btn btn-primary"
                    disabled=move || session.with(|s| !s.is_ready() || s.is_loading)
                    on:click=on_generate
                >
                    {move || if session.with(|s| s.is_loading) { "Generating..." } else { "Generate summary" }}
                </button>
            </div>

            <Show when=move || session.with(|s| s.is_loading)>
                <Loading />
            </Show>

            <SummaryView
                session=session
                speaking=speaking
                on_listen=on_listen
                on_stop=on_stop
                on_save=on_save
                on_edit=on_edit
            />

            <SavedList saved=saved on_open=on_open on_delete=on_delete />
        </div>
    }
}
