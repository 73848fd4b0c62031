//! 保存済み要約の一覧

use leptos::prelude::*;
use narrato_common::{filter_by_title, SummaryRecord};

#[component]
pub fn SavedList<FO, FD>(
    saved: ReadSignal<Vec<SummaryRecord>>,
    on_open: FO,
    on_delete: FD,
) -> impl IntoView
where
    FO: Fn(String) + 'static + Clone + Send + Sync,
    FD: Fn(String) + 'static + Clone + Send + Sync,
{
    let (query, set_query) = signal(String::new());

    let rows = move || {
        let records = saved.get();
        let query = query.get();
        filter_by_title(&records, &query)
            .into_iter()
            .filter_map(|record| {
                let id = record.id.clone()?;
                let title = record.display_title().to_string();
                let on_open = on_open.clone();
                let on_delete = on_delete.clone();
                let open_id = id.clone();
                Some(view! {
                    <li class="saved-item">
                        <button class="btn btn-tertiary btn-small" on:click=move |_| on_open(open_id.clone())>
                            {title}
                        </button>
                        <button class="btn btn-tertiary btn-small" on:click=move |_| on_delete(id.clone())>
                            "Delete"
                        </button>
                    </li>
                })
            })
            .collect_view()
    };

    view! {
        <div class="saved-list">
            <h3>"Saved summaries"</h3>
            <input
                type="search"
                placeholder="Search by title..."
                prop:value=move || query.get()
                on:input=move |ev| set_query.set(event_target_value(&ev))
            />
            <Show
                when=move || !saved.with(|s| s.is_empty())
                fallback=|| view! { <p class="text-muted">"Nothing saved yet"</p> }
            >
                <ul>{rows.clone()}</ul>
            </Show>
        </div>
    }
}
