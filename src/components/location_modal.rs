//! Location Modal Component
//!
//! Entry form for a new note at the chosen position. Fields reset only after
//! a successful submit; a failure leaves them exactly as typed.

use std::future::Future;

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::config::AvatarSettings;
use crate::form::{submit, FormState, SubmitOutcome};
use crate::models::{LatLng, NoteFields};

#[component]
pub fn LocationModal<F, Fut, E>(
    /// Open while `Some`
    #[prop(into)]
    position: Signal<Option<LatLng>>,
    on_submit: F,
    #[prop(into)] on_close: Callback<()>,
    #[prop(into)] on_submitted: Callback<()>,
) -> impl IntoView
where
    F: Fn(NoteFields) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<(), E>> + 'static,
    E: std::fmt::Display + 'static,
{
    let form = RwSignal::new(FormState::default());
    let busy = Memo::new(move |_| form.with(|f| f.submitting));
    let (error, set_error) = signal(None::<String>);
    let avatars = AvatarSettings::default();
    let on_submit = StoredValue::new(on_submit);

    let on_form_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        form.update(|f| f.submitting = true);
        let mut state = form.get_untracked();
        let position = position.get_untracked();
        let create = on_submit.get_value();
        set_error.set(None);
        spawn_local(async move {
            match submit(&mut state, position, create).await {
                SubmitOutcome::Submitted => {
                    form.set(state);
                    on_submitted.run(());
                }
                SubmitOutcome::Invalid(e) => {
                    form.update(|f| f.submitting = false);
                    set_error.set(Some(e.to_string()));
                }
                SubmitOutcome::Failed => form.update(|f| f.submitting = false),
            }
        });
    };

    // Shared by Cancel and the backdrop; ignored while submitting
    let cancel = move || {
        if form.try_update(|f| f.dismiss()).unwrap_or(false) {
            set_error.set(None);
            on_close.run(());
        }
    };

    let preview = move || {
        let handle = crate::form::normalize_handle(&form.with(|f| f.handle.clone()));
        (!handle.is_empty()).then(|| {
            let fallback = avatars.fallback;
            view! {
                <img
                    class="avatar avatar-sm avatar-preview"
                    src=avatars.avatar_url(&handle)
                    alt=handle.clone()
                    on:error=move |ev| {
                        use wasm_bindgen::JsCast;
                        if let Some(img) = ev.target().and_then(|t| t.dyn_into::<web_sys::HtmlImageElement>().ok()) {
                            img.set_onerror(None);
                            img.set_src(fallback);
                        }
                    }
                />
            }
        })
    };

    view! {
        <Show when=move || position.get().is_some()>
            <div class="modal-backdrop" on:click=move |_| cancel()>
                <div class="modal glass" on:click=|ev| ev.stop_propagation()>
                    <h2 class="modal-title">"Pin Your Location"</h2>
                    <p class="modal-description">"Share your location and add a note to the map"</p>

                    <form class="modal-form" on:submit=on_form_submit>
                        <label for="handle">"Your X Username"</label>
                        <div class="handle-row">
                            <input
                                id="handle"
                                type="text"
                                placeholder="e.g., Zun2025"
                                required
                                disabled=move || busy.get()
                                prop:value=move || form.with(|f| f.handle.clone())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    form.update(|f| f.handle = value);
                                }
                            />
                            {preview}
                        </div>

                        <label for="label">"Location (optional)"</label>
                        <input
                            id="label"
                            type="text"
                            placeholder="e.g., Lisbon"
                            disabled=move || busy.get()
                            prop:value=move || form.with(|f| f.label.clone())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                form.update(|f| f.label = value);
                            }
                        />

                        <label for="comment">"Your Comment"</label>
                        <textarea
                            id="comment"
                            rows="3"
                            placeholder="e.g., gBerry 🍓🍓"
                            required
                            disabled=move || busy.get()
                            prop:value=move || form.with(|f| f.body.clone())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                form.update(|f| f.body = value);
                            }
                        ></textarea>

                        {move || error.get().map(|e| view! { <p class="form-error">{e}</p> })}

                        <div class="modal-actions">
                            <button type="button" class="btn secondary" disabled=move || busy.get() on:click=move |_| cancel()>
                                "Cancel"
                            </button>
                            <button type="submit" class="btn primary" disabled=move || busy.get()>
                                {move || if busy.get() {
                                    view! { <span class="spinner"></span> "Saving..." }.into_any()
                                } else {
                                    view! { "Pin Location" }.into_any()
                                }}
                            </button>
                        </div>
                    </form>
                </div>
            </div>
        </Show>
    }
}
