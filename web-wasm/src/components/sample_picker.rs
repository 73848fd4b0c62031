//! サンプルライブラリ

use leptos::prelude::*;
use narrato_common::{find_sample, Session, SAMPLE_LIBRARY};

#[component]
pub fn SamplePicker(session: RwSignal<Session>) -> impl IntoView {
    let on_pick = move |id: u32| {
        if let Some(sample) = find_sample(id) {
            session.update(|s| s.select_sample(sample));
        }
    };

    view! {
        <div class="sample-picker">
            <h3>"Library"</h3>
            <ul>
                {SAMPLE_LIBRARY
                    .iter()
                    .map(|sample| {
                        let id = sample.id;
                        view! {
                            <li>
                                <button class="btn btn-tertiary btn-small" on:click=move |_| on_pick(id)>
                                    {sample.title}
                                    " "
                                    <span class="text-muted">{sample.doc_type.label()}</span>
                                </button>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </div>
    }
}
