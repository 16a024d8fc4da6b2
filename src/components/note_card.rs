//! Note Card Component
//!
//! One note with author, relative time, body, label and reactions. Used by
//! both the map popup and the recent-activity panel.

use leptos::prelude::*;

use crate::components::{Avatar, HandleLink, ReactionPicker};
use crate::models::NoteWithReactions;
use crate::store::{store_find_note, use_app_store, AppStateStoreFields};
use crate::time_ago::time_ago_now;

#[component]
pub fn NoteCard(note: NoteWithReactions, #[prop(optional)] compact: bool) -> impl IntoView {
    let store = use_app_store();
    let NoteWithReactions { note, .. } = note;
    let when = time_ago_now(note.created_at);
    let avatar_class = if compact { "avatar avatar-sm" } else { "avatar avatar-md" };

    // Follows the store so a re-fetch reseeds the picker
    let id = note.id.clone();
    let reactions = Memo::new(move |_| {
        store_find_note(&store, &id)
            .map(|n| n.reactions)
            .unwrap_or_default()
    });
    let revision = Signal::derive(move || store.revision().get());

    view! {
        <div class="note-card">
            <div class="note-author">
                <Avatar handle=note.handle.clone() class=avatar_class linked=true />
                <div class="note-author-text">
                    <HandleLink handle=note.handle.clone() />
                    <span class="note-time">{when}</span>
                </div>
            </div>
            <p class="note-body">{format!("\"{}\"", note.body)}</p>
            {note.label.map(|label| view! { <p class="note-label">{format!("📍 {}", label)}</p> })}
            <ReactionPicker note_id=note.id reactions=reactions revision=revision />
        </div>
    }
}
