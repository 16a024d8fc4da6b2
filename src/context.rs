//! Page Context
//!
//! Page mode and the note whose popup is open, shared via Leptos Context API.

use leptos::prelude::*;

use crate::models::LatLng;
use crate::page::PageMode;

/// Page-wide signals provided via context
#[derive(Clone, Copy)]
pub struct PageContext {
    /// Placing / composing state - read
    pub mode: ReadSignal<PageMode>,
    /// Placing / composing state - write
    set_mode: WriteSignal<PageMode>,
    /// Note whose popup is open - read
    pub active_note: ReadSignal<Option<String>>,
    /// Note whose popup is open - write
    set_active_note: WriteSignal<Option<String>>,
}

impl PageContext {
    pub fn new(
        mode: (ReadSignal<PageMode>, WriteSignal<PageMode>),
        active_note: (ReadSignal<Option<String>>, WriteSignal<Option<String>>),
    ) -> Self {
        Self {
            mode: mode.0,
            set_mode: mode.1,
            active_note: active_note.0,
            set_active_note: active_note.1,
        }
    }

    /// Pin button
    pub fn toggle_placing(&self) {
        self.set_mode.update(|m| *m = m.toggle_placing());
        self.close_popup();
    }

    /// Map click while placing opens the entry modal
    pub fn map_clicked(&self, position: LatLng) {
        self.set_mode.update(|m| *m = m.map_clicked(position));
    }

    pub fn submitted(&self) {
        self.set_mode.update(|m| *m = m.submitted());
    }

    pub fn cancelled(&self) {
        self.set_mode.update(|m| *m = m.cancelled());
    }

    pub fn open_popup(&self, note_id: String) {
        self.set_active_note.set(Some(note_id));
    }

    pub fn close_popup(&self) {
        self.set_active_note.set(None);
    }
}

pub fn use_page_context() -> PageContext {
    expect_context::<PageContext>()
}
