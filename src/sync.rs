//! Note Synchronization
//!
//! Fetch-and-join of notes and reactions, plus the write operations with
//! their user notifications. Everything here is independent of Leptos; the
//! reactive wrapper lives in `hooks`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::NoteStore;
use crate::error::StoreError;
use crate::models::{NewNote, NewReaction, Note, NoteFields, NoteWithReactions, Reaction};
use crate::toast::{Notifier, Toast};

/// Attach to each note exactly the reactions that reference it.
///
/// Note order is preserved; reactions keep their fetch order within a note.
/// Reactions pointing at an unknown note are dropped.
pub fn join_reactions(notes: Vec<Note>, reactions: Vec<Reaction>) -> Vec<NoteWithReactions> {
    let mut by_note: HashMap<String, Vec<Reaction>> = HashMap::new();
    for reaction in reactions {
        by_note.entry(reaction.note_id.clone()).or_default().push(reaction);
    }
    notes
        .into_iter()
        .map(|note| {
            let reactions = by_note.remove(&note.id).unwrap_or_default();
            NoteWithReactions { note, reactions }
        })
        .collect()
}

/// The `n` most recent notes of a newest-first collection
pub fn recent_notes(notes: &[NoteWithReactions], n: usize) -> &[NoteWithReactions] {
    &notes[..notes.len().min(n)]
}

/// `user_<ms>_<9 base-36 chars>` token standing in for a user
pub fn anonymous_identifier(now_ms: u64, entropy: f64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut fraction = entropy.clamp(0.0, 1.0 - f64::EPSILON);
    let mut suffix = String::with_capacity(9);
    for _ in 0..9 {
        fraction *= 36.0;
        let digit = fraction.floor() as usize;
        suffix.push(DIGITS[digit.min(35)] as char);
        fraction -= digit as f64;
    }
    format!("user_{}_{}", now_ms, suffix)
}

/// Fresh identifier from the browser clock and `Math.random`
pub fn browser_identifier() -> String {
    anonymous_identifier(js_sys::Date::now() as u64, js_sys::Math::random())
}

/// Cleared when the owning scope is torn down; async results check it before
/// touching shared state.
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Store operations wrapped with logging and toasts
#[derive(Clone)]
pub struct NoteSync<S, N> {
    store: S,
    notifier: N,
    identity: fn() -> String,
}

impl<S: NoteStore, N: Notifier> NoteSync<S, N> {
    pub fn new(store: S, notifier: N, identity: fn() -> String) -> Self {
        Self { store, notifier, identity }
    }

    async fn load(&self) -> Result<Vec<NoteWithReactions>, StoreError> {
        let notes = self.store.list_notes().await?;
        let reactions = self.store.list_reactions().await?;
        Ok(join_reactions(notes, reactions))
    }

    /// Full fetch of both tables, joined
    pub async fn fetch(&self) -> Result<Vec<NoteWithReactions>, StoreError> {
        match self.load().await {
            Ok(notes) => {
                log::debug!("[SYNC] loaded {} notes", notes.len());
                Ok(notes)
            }
            Err(e) => {
                log::error!("[SYNC] error fetching comments: {}", e);
                self.notifier.notify(Toast::error("Failed to load comments"));
                Err(e)
            }
        }
    }

    /// Insert a note; failures are notified and returned so the form keeps
    /// its fields
    pub async fn create(&self, fields: NoteFields) -> Result<(), StoreError> {
        let note = NewNote::from_fields(fields, None);
        match self.store.insert_note(&note).await {
            Ok(()) => {
                log::info!("[SYNC] pinned note for @{}", note.handle);
                self.notifier.notify(Toast::success("Your location has been pinned!"));
                Ok(())
            }
            Err(e) => {
                log::error!("[SYNC] error adding comment: {}", e);
                self.notifier.notify(Toast::error("Failed to add location"));
                Err(e)
            }
        }
    }

    /// Insert one reaction under a fresh anonymous identifier
    pub async fn add_reaction(&self, note_id: &str, emoji: &str) {
        let reaction = NewReaction {
            note_id: note_id.to_string(),
            emoji: emoji.to_string(),
            user_identifier: (self.identity)(),
        };
        if let Err(e) = self.store.insert_reaction(&reaction).await {
            log::error!("[SYNC] error adding reaction: {}", e);
            self.notifier.notify(Toast::error("Failed to add reaction"));
        }
    }

    /// Delete every reaction with `emoji` on the note
    pub async fn remove_reaction(&self, note_id: &str, emoji: &str) {
        if let Err(e) = self.store.delete_reactions(note_id, emoji).await {
            log::error!("[SYNC] error removing reaction: {}", e);
            self.notifier.notify(Toast::error("Failed to remove reaction"));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::LatLng;
    use crate::toast::ToastVariant;
    use chrono::{TimeZone, Utc};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::rc::Rc;

    pub fn note(id: &str, lat: Option<f64>, lng: Option<f64>) -> Note {
        Note {
            id: id.to_string(),
            handle: format!("user{}", id),
            display_name: None,
            profile_pic: None,
            body: format!("note {}", id),
            label: None,
            country_code: Some("XX".to_string()),
            latitude: lat,
            longitude: lng,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            updated_at: None,
        }
    }

    pub fn reaction(id: &str, note_id: &str, emoji: &str) -> Reaction {
        Reaction {
            id: id.to_string(),
            note_id: note_id.to_string(),
            emoji: emoji.to_string(),
            user_identifier: format!("user_{}", id),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    /// Operation log of the fake store
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        ListNotes,
        ListReactions,
        InsertNote(NewNote),
        InsertReaction(NewReaction),
        DeleteReactions(String, String),
    }

    #[derive(Clone, Default)]
    pub struct FakeStore {
        pub notes: Vec<Note>,
        pub reactions: Vec<Reaction>,
        pub fail: bool,
        /// Killed while the notes request is in flight
        pub teardown_during_fetch: Option<Liveness>,
        pub calls: Rc<RefCell<Vec<Call>>>,
    }

    impl FakeStore {
        fn result(&self) -> Result<(), StoreError> {
            if self.fail {
                Err(StoreError::Status { status: 500, body: "boom".to_string() })
            } else {
                Ok(())
            }
        }
    }

    impl NoteStore for FakeStore {
        async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
            self.calls.borrow_mut().push(Call::ListNotes);
            if let Some(live) = &self.teardown_during_fetch {
                live.kill();
            }
            self.result().map(|_| self.notes.clone())
        }

        async fn list_reactions(&self) -> Result<Vec<Reaction>, StoreError> {
            self.calls.borrow_mut().push(Call::ListReactions);
            self.result().map(|_| self.reactions.clone())
        }

        async fn insert_note(&self, note: &NewNote) -> Result<(), StoreError> {
            self.calls.borrow_mut().push(Call::InsertNote(note.clone()));
            self.result()
        }

        async fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), StoreError> {
            self.calls.borrow_mut().push(Call::InsertReaction(reaction.clone()));
            self.result()
        }

        async fn delete_reactions(&self, note_id: &str, emoji: &str) -> Result<(), StoreError> {
            self.calls
                .borrow_mut()
                .push(Call::DeleteReactions(note_id.to_string(), emoji.to_string()));
            self.result()
        }
    }

    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub toasts: Rc<RefCell<Vec<Toast>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, toast: Toast) {
            self.toasts.borrow_mut().push(toast);
        }
    }

    pub fn fixed_identity() -> String {
        "user_1_test".to_string()
    }

    fn engine(store: FakeStore) -> (NoteSync<FakeStore, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        (NoteSync::new(store, notifier.clone(), fixed_identity), notifier)
    }

    pub fn fields() -> NoteFields {
        NoteFields {
            handle: "zun".to_string(),
            body: "hello".to_string(),
            label: None,
            position: LatLng::new(10.0, 20.0),
        }
    }

    #[test]
    fn test_join_attaches_only_matching_reactions() {
        let notes = vec![note("a", None, None), note("b", None, None), note("c", None, None)];
        let reactions = vec![
            reaction("1", "a", "👍"),
            reaction("2", "b", "🔥"),
            reaction("3", "a", "🚀"),
            reaction("4", "zzz", "👍"),
        ];
        let joined = join_reactions(notes, reactions);

        assert_eq!(joined.len(), 3);
        for item in &joined {
            assert!(item.reactions.iter().all(|r| r.note_id == item.note.id));
        }
        let ids: Vec<&str> = joined[0].reactions.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(joined[1].reactions.len(), 1);
        assert!(joined[2].reactions.is_empty());
    }

    #[test]
    fn test_join_with_no_reactions_gives_empty_sets() {
        let joined = join_reactions(vec![note("a", None, None), note("b", None, None)], vec![]);
        assert_eq!(joined.len(), 2);
        assert!(joined.iter().all(|n| n.reactions.is_empty()));
    }

    #[test]
    fn test_recent_notes_takes_prefix() {
        let joined = join_reactions((0..8).map(|i| note(&i.to_string(), None, None)).collect(), vec![]);
        let recent = recent_notes(&joined, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].id(), "0");
        assert_eq!(recent_notes(&joined[..2], 5).len(), 2);
    }

    #[test]
    fn test_anonymous_identifier_shape() {
        let id = anonymous_identifier(1_700_000_000_000, 0.5);
        assert!(id.starts_with("user_1700000000000_"));
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_eq!(anonymous_identifier(1, 0.0), "user_1_000000000");
        assert_eq!(anonymous_identifier(1, 1.0).len(), "user_1_".len() + 9);
    }

    #[test]
    fn test_fetch_reads_both_tables_and_joins() {
        let store = FakeStore {
            notes: vec![note("a", Some(1.0), Some(2.0))],
            reactions: vec![reaction("1", "a", "👍")],
            ..Default::default()
        };
        let (sync, notifier) = engine(store.clone());
        let notes = block_on(sync.fetch()).unwrap();
        assert_eq!(notes[0].reactions.len(), 1);
        assert_eq!(*store.calls.borrow(), vec![Call::ListNotes, Call::ListReactions]);
        assert!(notifier.toasts.borrow().is_empty());
    }

    #[test]
    fn test_fetch_failure_notifies_destructive() {
        let (sync, notifier) = engine(FakeStore { fail: true, ..Default::default() });
        assert!(block_on(sync.fetch()).is_err());
        let toasts = notifier.toasts.borrow();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].variant, ToastVariant::Destructive);
        assert_eq!(toasts[0].description, "Failed to load comments");
    }

    #[test]
    fn test_create_inserts_with_default_code_and_notifies() {
        let store = FakeStore::default();
        let (sync, notifier) = engine(store.clone());
        block_on(sync.create(fields())).unwrap();

        match &store.calls.borrow()[0] {
            Call::InsertNote(note) => {
                assert_eq!(note.country_code, "XX");
                assert_eq!(note.latitude, 10.0);
            }
            other => panic!("unexpected call {:?}", other),
        }
        assert_eq!(notifier.toasts.borrow()[0].variant, ToastVariant::Default);
    }

    #[test]
    fn test_create_failure_is_returned() {
        let (sync, notifier) = engine(FakeStore { fail: true, ..Default::default() });
        let result = block_on(sync.create(fields()));
        assert!(matches!(result, Err(StoreError::Status { status: 500, .. })));
        assert_eq!(notifier.toasts.borrow()[0].description, "Failed to add location");
    }

    #[test]
    fn test_reaction_failures_are_only_notified() {
        let (sync, notifier) = engine(FakeStore { fail: true, ..Default::default() });
        block_on(sync.add_reaction("a", "👍"));
        block_on(sync.remove_reaction("a", "👍"));
        let descriptions: Vec<String> = notifier.toasts.borrow().iter().map(|t| t.description.clone()).collect();
        assert_eq!(descriptions, vec!["Failed to add reaction", "Failed to remove reaction"]);
    }

    #[test]
    fn test_remove_deletes_by_glyph() {
        let store = FakeStore::default();
        let (sync, notifier) = engine(store.clone());

        block_on(sync.remove_reaction("a", "👍"));
        assert_eq!(
            store.calls.borrow()[0],
            Call::DeleteReactions("a".to_string(), "👍".to_string())
        );
        assert!(notifier.toasts.borrow().is_empty());
    }

    #[test]
    fn test_add_uses_fresh_identifier() {
        let store = FakeStore::default();
        let (sync, _) = engine(store.clone());

        block_on(sync.add_reaction("a", "🔥"));
        assert_eq!(
            store.calls.borrow()[0],
            Call::InsertReaction(NewReaction {
                note_id: "a".to_string(),
                emoji: "🔥".to_string(),
                user_identifier: "user_1_test".to_string(),
            })
        );
    }

    #[test]
    fn test_liveness_kill_is_shared() {
        let alive = Liveness::new();
        let clone = alive.clone();
        assert!(clone.is_alive());
        alive.kill();
        assert!(!clone.is_alive());
    }
}
