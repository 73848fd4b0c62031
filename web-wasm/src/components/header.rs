//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Narrato"</h1>
            <p class="text-muted">"Summaries, insights, translation and narration for your reading"</p>
        </header>
    }
}
