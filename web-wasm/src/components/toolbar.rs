//! Search box and export button

use leptos::prelude::*;

#[component]
pub fn Toolbar<FS, FE>(
    search: Signal<String>,
    can_export: Signal<bool>,
    on_search: FS,
    on_export: FE,
) -> impl IntoView
where
    FS: Fn(String) + 'static + Clone,
    FE: Fn(()) + Send + Sync + 'static + Clone,
{
    view! {
        <div class="toolbar">
            <input
                type="search"
                class="search-input"
                placeholder="Search matches..."
                prop:value=move || search.get()
                on:input=move |ev| on_search(event_target_value(&ev))
            />
            <Show when=move || can_export.get()>
                <button
                    class="btn btn-secondary"
                    on:click={
                        let on_export = on_export.clone();
                        move |_| on_export(())
                    }
                >
                    "Export CSV"
                </button>
            </Show>
        </div>
    }
}
