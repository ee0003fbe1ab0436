//! Header component

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"Gazette Matcher"</h1>
            <p class="subtitle">"Match gazette notices against the succession registry"</p>
        </header>
    }
}
