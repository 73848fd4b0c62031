//! ローディング表示

use leptos::prelude::*;

#[component]
pub fn Loading() -> impl IntoView {
    view! {
        <div class="progress-container">
            <div class="progress-bar indeterminate">
                <div class="progress-fill" />
            </div>
            <p class="progress-text">"Generating summary..."</p>
        </div>
    }
}
