//! Pinboard Map App
//!
//! Config check, then the full-screen map page with header, recent notes,
//! pin button and entry modal.

use leptos::prelude::*;

use crate::components::{InteractiveMap, LocationModal, RecentNotes};
use crate::config::BackendConfig;
use crate::context::PageContext;
use crate::hooks::use_map_data;
use crate::models::NoteFields;
use crate::page::PageMode;
use crate::store::{provide_app_store, AppStateStoreFields};
use crate::toast::{ToastStack, Toasts};

const DARK_CLASS: &str = "dark";

#[component]
pub fn App() -> impl IntoView {
    Toasts::provide();

    let page = match BackendConfig::from_build_env() {
        Ok(config) => view! { <MapPage config=config /> }.into_any(),
        Err(e) => {
            log::error!("[APP] {}", e);
            view! { <ConfigError message=e.to_string() /> }.into_any()
        }
    };

    view! {
        {page}
        <ToastStack />
    }
}

#[component]
fn ConfigError(message: String) -> impl IntoView {
    view! {
        <div class="screen-center">
            <div class="config-error glass">
                <h2>"Backend not configured"</h2>
                <p>{message}</p>
                <p class="muted">
                    "Set PINBOARD_SUPABASE_URL and PINBOARD_SUPABASE_ANON_KEY when building."
                </p>
            </div>
        </div>
    }
}

/// Toggle the dark theme class on `<html>` and `<body>`
fn set_dark(on: bool) {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let root = document.document_element();
    let body = document.body().map(web_sys::Element::from);
    for el in [root, body].into_iter().flatten() {
        let classes = el.class_list();
        let result = if on { classes.add_1(DARK_CLASS) } else { classes.remove_1(DARK_CLASS) };
        if let Err(e) = result {
            log::debug!("[APP] class list update failed: {:?}", e);
        }
    }
}

#[component]
fn MapPage(config: BackendConfig) -> impl IntoView {
    let store = provide_app_store();
    let (mode, set_mode) = signal(PageMode::default());
    let (active_note, set_active_note) = signal::<Option<String>>(None);
    let page = PageContext::new((mode, set_mode), (active_note, set_active_note));
    provide_context(page);

    let data = use_map_data(config);
    provide_context(data);

    set_dark(true);
    on_cleanup(|| set_dark(false));

    let pending = Signal::derive(move || mode.get().pending_position());

    view! {
        <Show
            when=move || !store.loading().get()
            fallback=|| view! {
                <div class="screen-center">
                    <div class="spinner large"></div>
                    <p class="muted">"Loading map..."</p>
                </div>
            }
        >
            <div class="map-page">
                <header class="banner">
                    <img class="banner-logo" src="/assets/logo.svg" alt="" />
                    <span>"Write about Boundless on World Map"</span>
                </header>

                <InteractiveMap />

                <div class="recent-dock">
                    <RecentNotes />
                </div>

                <div class="pin-dock">
                    <button
                        class="pin-button"
                        class:placing=move || mode.get().is_placing()
                        on:click=move |_| page.toggle_placing()
                    >
                        {move || mode.get().pin_button_label()}
                    </button>
                </div>
            </div>
        </Show>

        <LocationModal
            position=pending
            on_submit=move |fields: NoteFields| async move { data.create(fields).await }
            on_close=move |_| page.cancelled()
            on_submitted=move |_| page.submitted()
        />
    }
}
