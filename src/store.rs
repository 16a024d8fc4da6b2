//! Global Application State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::models::NoteWithReactions;

/// Notes on the map plus the first-load flag
#[derive(Clone, Debug, Store)]
pub struct AppState {
    /// Newest first, each with its reactions attached
    pub notes: Vec<NoteWithReactions>,
    /// True until the first fetch has finished (either way)
    pub loading: bool,
    /// Bumped by every successful fetch, even one returning identical rows
    pub revision: u64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            loading: true,
            revision: 0,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Type alias for the store
pub type AppStore = Store<AppState>;

/// Create the store and provide it to children
pub fn provide_app_store() -> AppStore {
    let store = Store::new(AppState::new());
    provide_context(store);
    store
}

/// Get the app store from context
pub fn use_app_store() -> AppStore {
    expect_context::<AppStore>()
}

// ========================
// Store Helper Functions
// ========================

/// Replace the whole collection with a fresh fetch
pub fn store_replace_notes(store: &AppStore, notes: Vec<NoteWithReactions>) {
    store.notes().set(notes);
    store.revision().update(|r| *r = r.wrapping_add(1));
}

/// Mark the first load as finished
pub fn store_finish_loading(store: &AppStore) {
    if store.loading().get_untracked() {
        store.loading().set(false);
    }
}

/// Look up one note by id
pub fn store_find_note(store: &AppStore, id: &str) -> Option<NoteWithReactions> {
    store.notes().with(|notes| notes.iter().find(|n| n.id() == id).cloned())
}
