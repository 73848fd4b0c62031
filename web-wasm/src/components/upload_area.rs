//! アップロードエリアコンポーネント

use leptos::prelude::*;
use narrato_common::{SelectedFile, Session};
use wasm_bindgen::prelude::*;
use web_sys::{DragEvent, File, FileList, FileReader};

#[component]
pub fn UploadArea(session: RwSignal<Session>) -> impl IntoView {
    let (is_dragover, set_is_dragover) = signal(false);

    let on_drop = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(false);

        if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
            handle_files(session, files);
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        set_is_dragover.set(true);
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        // ファイル選択ダイアログを開く
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let Some(input) = document
            .create_element("input")
            .ok()
            .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        input.set_type("file");
        input.set_accept(".txt,.text,.md,.pdf,.epub,text/plain");

        let input_clone = input.clone();
        let closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
            if let Some(files) = input_clone.files() {
                handle_files(session, files);
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
        input.click();
    };

    let file_label = move || {
        session.with(|s| {
            s.upload
                .source_file
                .as_ref()
                .map(|f| format!("{} ({} bytes)", f.name, f.size))
        })
    };

    view! {
        <div
            class=move || if is_dragover.get() { "upload-area dragover" } else { "upload-area" }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <div class="upload-icon">"📄"</div>
            <Show
                when=move || file_label().is_some()
                fallback=|| view! {
                    <p>"Drop a file here or click to choose"</p>
                    <p class="text-muted">"Plain text (.txt) is read directly"</p>
                }
            >
                <p>{file_label}</p>
                <Show when=move || session.with(|s| s.upload.extraction_pending)>
                    <p class="text-muted">"Reading file..."</p>
                </Show>
            </Show>
        </div>
    }
}

/// 先頭のファイルだけを選択する
fn handle_files(session: RwSignal<Session>, files: FileList) {
    let Some(file) = files.get(0) else {
        return;
    };

    let selected = SelectedFile::new(file.name(), file.size() as u64);
    let mut pending = None;
    session.update(|s| {
        let selection = s.select_file(&selected);
        if s.upload.extraction_pending {
            pending = Some(selection);
        }
    });

    if let Some(selection) = pending {
        read_text(session, file, selection);
    }
}

fn read_text(session: RwSignal<Session>, file: File, selection: u64) {
    let fail = move |reason: String| {
        session.update(|s| {
            s.fail_extraction(selection, &reason);
        });
    };

    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(e) => {
            fail(js_message(&e));
            return;
        }
    };

    // 後から別のファイルが選ばれていれば、どの結果も無視される
    let reader_clone = reader.clone();
    let on_load = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        match reader_clone.result().ok().and_then(|r| r.as_string()) {
            Some(text) => session.update(|s| {
                s.complete_extraction(selection, text);
            }),
            None => fail("file is not text".to_string()),
        }
    }) as Box<dyn FnMut(_)>);

    let reader_clone = reader.clone();
    let on_error = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        let reason = reader_clone
            .error()
            .map(|e| e.message())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "file could not be read".to_string());
        fail(reason);
    }) as Box<dyn FnMut(_)>);

    let on_abort = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        fail("reading was aborted".to_string());
    }) as Box<dyn FnMut(_)>);

    reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
    reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    reader.set_onabort(Some(on_abort.as_ref().unchecked_ref()));
    on_load.forget();
    on_error.forget();
    on_abort.forget();

    if let Err(e) = reader.read_as_text(&file) {
        web_sys::console::warn_1(&e);
        fail(js_message(&e));
    }
}

fn js_message(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
