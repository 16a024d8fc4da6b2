//! Backend Access
//!
//! PostgREST table access and the realtime change feed of the hosted backend,
//! organized by table.

mod notes;
mod reactions;
pub mod realtime;
mod socket;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::error::StoreError;
use crate::models::{NewNote, NewReaction, Note, Reaction};

pub use notes::notes_path;
pub use reactions::delete_reactions_path;
pub use realtime::ChangeEvent;
pub use socket::RealtimeClient;

/// Table operations the sync engine needs
#[allow(async_fn_in_trait)]
pub trait NoteStore {
    /// All notes, newest first
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;
    /// All reactions
    async fn list_reactions(&self) -> Result<Vec<Reaction>, StoreError>;
    async fn insert_note(&self, note: &NewNote) -> Result<(), StoreError>;
    async fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), StoreError>;
    /// Delete every reaction on `note_id` with glyph `emoji`
    async fn delete_reactions(&self, note_id: &str, emoji: &str) -> Result<(), StoreError>;
}

/// PostgREST client authenticated with the anonymous key
#[derive(Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base: String,
    anon_key: String,
}

impl RestStore {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: config.rest_url(),
            anon_key: config.anon_key.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base, path))
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    fn insert(&self, table: &str) -> RequestBuilder {
        self.request(Method::POST, table).header("Prefer", "return=minimal")
    }
}

/// Turn non-2xx responses into `StoreError::Status`
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status { status: status.as_u16(), body })
    }
}

async fn read_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, StoreError> {
    let text = check(response).await?.text().await?;
    Ok(serde_json::from_str(&text)?)
}

impl NoteStore for RestStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let response = self.request(Method::GET, &notes_path()).send().await?;
        read_rows(response).await
    }

    async fn list_reactions(&self) -> Result<Vec<Reaction>, StoreError> {
        let response = self.request(Method::GET, &reactions::list_path()).send().await?;
        read_rows(response).await
    }

    async fn insert_note(&self, note: &NewNote) -> Result<(), StoreError> {
        let response = self.insert(notes::TABLE).json(&[note]).send().await?;
        check(response).await.map(|_| ())
    }

    async fn insert_reaction(&self, reaction: &NewReaction) -> Result<(), StoreError> {
        let response = self.insert(reactions::TABLE).json(&[reaction]).send().await?;
        check(response).await.map(|_| ())
    }

    async fn delete_reactions(&self, note_id: &str, emoji: &str) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, &delete_reactions_path(note_id, emoji))
            .send()
            .await?;
        check(response).await.map(|_| ())
    }
}
