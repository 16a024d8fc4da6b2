//! Map Data Hook
//!
//! Loads notes and reactions on mount, keeps them fresh from the realtime
//! feed, and exposes the write operations. Results landing after unmount are
//! dropped.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::backend::{ChangeEvent, NoteStore, RealtimeClient, RestStore};
use crate::config::{BackendConfig, NOTES_TABLE, REACTIONS_TABLE};
use crate::error::StoreError;
use crate::models::{NoteFields, Reaction};
use crate::reactions::{reaction_intent, ReactionIntent};
use crate::store::{store_finish_loading, store_replace_notes, use_app_store, AppStore};
use crate::sync::{browser_identifier, Liveness, NoteSync};
use crate::toast::{use_toasts, Notifier, Toasts};

/// Handle returned by [`use_map_data`]
pub struct MapData<S = RestStore, N = Toasts> {
    pub store: AppStore,
    sync: StoredValue<NoteSync<S, N>, LocalStorage>,
    live: StoredValue<Liveness>,
}

impl<S, N> Clone for MapData<S, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, N> Copy for MapData<S, N> {}

/// Fetch on mount, subscribe to both tables, tear everything down on cleanup.
///
/// Expects the app store and toasts in context.
pub fn use_map_data(config: BackendConfig) -> MapData {
    let sync = NoteSync::new(RestStore::new(&config), use_toasts(), browser_identifier);
    let data = MapData::new(use_app_store(), sync);

    data.refresh();

    let client = StoredValue::new_local(subscribe(data, &config));

    on_cleanup(move || {
        data.release();
        if let Some(Some(client)) = client.try_update_value(|c| c.take()) {
            client.disconnect();
        }
        log::debug!("[SYNC] map data released");
    });

    data
}

fn subscribe(data: MapData, config: &BackendConfig) -> Option<RealtimeClient> {
    let client = match RealtimeClient::connect(config) {
        Ok(client) => client,
        Err(e) => {
            log::error!("[REALTIME] connect failed: {}", e);
            return None;
        }
    };
    for (channel, table) in [
        ("user_comments_changes", NOTES_TABLE),
        ("comment_reactions_changes", REACTIONS_TABLE),
    ] {
        let on_change = move |event: ChangeEvent| {
            log::debug!("[SYNC] refreshing after {:?} on {}", event.kind, event.table);
            data.refresh();
        };
        if let Err(e) = client.subscribe(channel, table, on_change) {
            log::error!("[REALTIME] subscribe to {} failed: {}", table, e);
        }
    }
    Some(client)
}

impl<S, N> MapData<S, N>
where
    S: NoteStore + Clone + 'static,
    N: Notifier + Clone + 'static,
{
    pub fn new(store: AppStore, sync: NoteSync<S, N>) -> Self {
        Self {
            store,
            sync: StoredValue::new_local(sync),
            live: StoredValue::new(Liveness::new()),
        }
    }

    /// Stop applying results; in-flight requests finish but change nothing
    pub fn release(&self) {
        if let Some(live) = self.live.try_get_value() {
            live.kill();
        }
    }

    fn engine(&self) -> Option<(NoteSync<S, N>, Liveness)> {
        let live = self.live.try_get_value()?;
        if !live.is_alive() {
            return None;
        }
        Some((self.sync.try_get_value()?, live))
    }

    /// Full re-fetch in the background
    pub fn refresh(&self) {
        spawn_local(self.reload());
    }

    /// One full re-fetch; the last-known collection stays on failure
    pub async fn reload(self) {
        let Some((sync, live)) = self.engine() else {
            return;
        };
        let result = sync.fetch().await;
        if !live.is_alive() {
            return;
        }
        if let Ok(notes) = result {
            store_replace_notes(&self.store, notes);
        }
        store_finish_loading(&self.store);
    }

    /// Insert a note; the error is returned so the form keeps its fields
    pub async fn create(&self, fields: NoteFields) -> Result<(), StoreError> {
        let (sync, _) = self.engine().ok_or(StoreError::Disposed)?;
        sync.create(fields).await
    }

    pub fn add_reaction(&self, note_id: String, emoji: String) {
        let Some((sync, _)) = self.engine() else {
            return;
        };
        spawn_local(async move {
            sync.add_reaction(&note_id, &emoji).await;
        });
    }

    pub fn remove_reaction(&self, note_id: String, emoji: String) {
        let Some((sync, _)) = self.engine() else {
            return;
        };
        spawn_local(async move {
            sync.remove_reaction(&note_id, &emoji).await;
        });
    }

    /// Remove when anyone reacted with `emoji`, add otherwise. The realtime
    /// feed brings the result back.
    pub fn toggle_reaction(&self, reactions: &[Reaction], note_id: String, emoji: String) -> ReactionIntent {
        let intent = reaction_intent(reactions, &emoji);
        match intent {
            ReactionIntent::Add => self.add_reaction(note_id, emoji),
            ReactionIntent::Remove => self.remove_reaction(note_id, emoji),
        }
        intent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::realtime::{ChannelRegistry, Inbound};
    use crate::store::{AppState, AppStateStoreFields};
    use crate::sync::tests::{fields, fixed_identity, note, reaction, Call, FakeStore, RecordingNotifier};
    use futures::executor::block_on;
    use reactive_stores::Store;
    use serde_json::json;
    use std::rc::Rc;

    fn map_data(store: FakeStore) -> (MapData<FakeStore, RecordingNotifier>, RecordingNotifier) {
        let notifier = RecordingNotifier::default();
        let sync = NoteSync::new(store, notifier.clone(), fixed_identity);
        (MapData::new(Store::new(AppState::new()), sync), notifier)
    }

    fn seeded() -> FakeStore {
        FakeStore {
            notes: vec![note("a", Some(1.0), Some(2.0)), note("b", None, None)],
            reactions: vec![reaction("1", "a", "👍")],
            ..Default::default()
        }
    }

    fn list_calls(store: &FakeStore) -> usize {
        store.calls.borrow().iter().filter(|c| **c == Call::ListNotes).count()
    }

    fn change_frame(topic: &str, table: &str) -> String {
        json!({
            "topic": topic,
            "event": "postgres_changes",
            "ref": null,
            "payload": {
                "data": { "table": table, "type": "INSERT", "record": { "id": "x" } }
            }
        })
        .to_string()
    }

    #[test]
    fn test_reload_fills_store_and_finishes_loading() {
        let fake = seeded();
        let (data, _) = map_data(fake.clone());

        block_on(data.reload());

        assert!(!data.store.loading().get_untracked());
        let notes = data.store.notes().get_untracked();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].reactions.len(), 1);
        assert_eq!(list_calls(&fake), 1);
    }

    #[test]
    fn test_failed_reload_keeps_collection_but_stops_loading() {
        let (data, notifier) = map_data(FakeStore { fail: true, ..Default::default() });

        block_on(data.reload());

        assert!(!data.store.loading().get_untracked());
        assert!(data.store.notes().get_untracked().is_empty());
        assert_eq!(data.store.revision().get_untracked(), 0);
        assert_eq!(notifier.toasts.borrow().len(), 1);
    }

    #[test]
    fn test_each_change_event_refetches_once() {
        let fake = seeded();
        let (data, _) = map_data(fake.clone());
        let mut registry = ChannelRegistry::new("anon");
        let refetch = Rc::new(move |_: ChangeEvent| block_on(data.reload()));
        let notes_topic = registry.join("user_comments_changes", NOTES_TABLE, refetch.clone()).unwrap();
        let reactions_topic = registry
            .join("comment_reactions_changes", REACTIONS_TABLE, refetch)
            .unwrap();

        let frames = [
            change_frame(&notes_topic, NOTES_TABLE),
            change_frame(&reactions_topic, REACTIONS_TABLE),
            change_frame(&notes_topic, NOTES_TABLE),
        ];
        for frame in &frames {
            match registry.receive(frame).unwrap() {
                Inbound::Change(handler, event) => handler(event),
                _ => panic!("expected a change"),
            }
        }

        assert_eq!(list_calls(&fake), 3);
        assert_eq!(data.store.revision().get_untracked(), 3);
    }

    #[test]
    fn test_fetch_landing_after_teardown_is_dropped() {
        let live = Liveness::new();
        let fake = FakeStore {
            teardown_during_fetch: Some(live.clone()),
            ..seeded()
        };
        let notifier = RecordingNotifier::default();
        let data = MapData {
            store: Store::new(AppState::new()),
            sync: StoredValue::new_local(NoteSync::new(fake.clone(), notifier, fixed_identity)),
            live: StoredValue::new(live),
        };

        block_on(data.reload());

        assert_eq!(list_calls(&fake), 1);
        assert!(data.store.loading().get_untracked());
        assert!(data.store.notes().get_untracked().is_empty());
    }

    #[test]
    fn test_released_data_sends_nothing() {
        let fake = seeded();
        let (data, _) = map_data(fake.clone());
        data.release();

        block_on(data.reload());
        let created = block_on(data.create(fields()));

        assert!(matches!(created, Err(StoreError::Disposed)));
        assert!(fake.calls.borrow().is_empty());
        assert!(data.store.loading().get_untracked());
    }

    #[test]
    fn test_create_after_dispose_is_an_error() {
        let fake = FakeStore::default();
        let (data, _) = map_data(fake.clone());
        data.sync.dispose();

        let created = block_on(data.create(fields()));
        assert!(matches!(created, Err(StoreError::Disposed)));
        assert!(fake.calls.borrow().is_empty());
    }
}
