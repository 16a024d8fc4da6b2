//! UI Components
//!
//! Reusable Leptos components.

mod avatar;
mod location_modal;
mod map_view;
mod note_card;
mod reaction_picker;
mod recent_notes;

pub use avatar::{Avatar, HandleLink};
pub use location_modal::LocationModal;
pub use map_view::InteractiveMap;
pub use note_card::NoteCard;
pub use reaction_picker::ReactionPicker;
pub use recent_notes::RecentNotes;
