//! Upload form: the two documents, matching parameters and the clear action

use gazette_matcher_common::{MatchMode, Threshold};
use leptos::html::Input;
use leptos::prelude::*;

#[component]
pub fn UploadForm<FS, FC>(
    pdf_ref: NodeRef<Input>,
    excel_ref: NodeRef<Input>,
    mode: RwSignal<MatchMode>,
    threshold: RwSignal<Threshold>,
    is_submitting: Signal<bool>,
    on_submit: FS,
    on_clear: FC,
) -> impl IntoView
where
    FS: Fn(()) + 'static + Clone,
    FC: Fn(()) + 'static + Clone,
{
    let threshold_enabled = move || mode.get().uses_threshold();

    view! {
        <form
            class="upload-form"
            on:submit={
                let on_submit = on_submit.clone();
                move |ev: leptos::ev::SubmitEvent| {
                    ev.prevent_default();
                    on_submit(());
                }
            }
        >
            <div class="form-grid">
                <div class="form-group">
                    <label for="pdf-file">"Gazette PDF"</label>
                    <input type="file" id="pdf-file" accept=".pdf" node_ref=pdf_ref />
                </div>

                <div class="form-group">
                    <label for="excel-file">"Registry Excel"</label>
                    <input type="file" id="excel-file" accept=".xlsx,.xls" node_ref=excel_ref />
                </div>

                <div class="form-group">
                    <label for="mode">"Matching Mode"</label>
                    <select
                        id="mode"
                        on:change=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<MatchMode>() {
                                mode.set(value);
                            }
                        }
                    >
                        {MatchMode::ALL
                            .iter()
                            .map(|&m| {
                                view! {
                                    <option value=m.as_str() selected=move || mode.get() == m>
                                        {m.label()}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="form-group" class:disabled=move || !threshold_enabled()>
                    <label for="threshold">
                        "Fuzzy Threshold: " {move || threshold.get().to_string()}
                    </label>
                    <input
                        type="range"
                        id="threshold"
                        min=Threshold::MIN.to_string()
                        max=Threshold::MAX.to_string()
                        step="0.01"
                        disabled=move || !threshold_enabled()
                        prop:value=move || threshold.get().value().to_string()
                        on:input=move |ev| {
                            if let Ok(value) = event_target_value(&ev).parse::<Threshold>() {
                                threshold.set(value);
                            }
                        }
                    />
                </div>
            </div>

            <div class="form-actions">
                <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                    {move || if is_submitting.get() { "Processing..." } else { "Upload & Match" }}
                </button>
                <button
                    type="button"
                    class="btn btn-danger"
                    disabled=move || is_submitting.get()
                    on:click={
                        let on_clear = on_clear.clone();
                        move |_| on_clear(())
                    }
                >
                    "Clear DB"
                </button>
            </div>
        </form>
    }
}
