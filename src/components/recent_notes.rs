//! Recent Notes Panel
//!
//! The newest five notes.

use leptos::prelude::*;

use crate::components::NoteCard;
use crate::store::{use_app_store, AppStateStoreFields};
use crate::sync::recent_notes;

pub const RECENT_COUNT: usize = 5;

#[component]
pub fn RecentNotes() -> impl IntoView {
    let store = use_app_store();
    let recent = move || store.notes().with(|notes| recent_notes(notes, RECENT_COUNT).to_vec());

    view! {
        <aside class="recent-notes glass">
            <h4>"Recent Notes"</h4>
            <Show
                when=move || store.notes().with(|notes| !notes.is_empty())
                fallback=|| view! {
                    <p class="recent-empty">"No notes yet. Be the first to pin your location!"</p>
                }
            >
                <div class="recent-list">
                    <For
                        each=recent
                        key=|n| n.note.id.clone()
                        children=move |note| view! { <NoteCard note=note compact=true /> }
                    />
                </div>
            </Show>
        </aside>
    }
}
