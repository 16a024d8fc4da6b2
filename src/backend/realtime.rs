//! Realtime Channel Protocol
//!
//! Phoenix channel frames (protocol `vsn=1.0.0`) as spoken by the hosted
//! realtime service. `ChannelRegistry` is transport-free: it queues outbound
//! frames in an outbox and decodes inbound text frames, leaving the socket to
//! `RealtimeClient`.

use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::RealtimeError;

pub const PHOENIX_TOPIC: &str = "phoenix";
pub const EVENT_JOIN: &str = "phx_join";
pub const EVENT_LEAVE: &str = "phx_leave";
pub const EVENT_REPLY: &str = "phx_reply";
pub const EVENT_ERROR: &str = "phx_error";
pub const EVENT_CLOSE: &str = "phx_close";
pub const EVENT_HEARTBEAT: &str = "heartbeat";
pub const EVENT_POSTGRES_CHANGES: &str = "postgres_changes";

/// One protocol frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub topic: String,
    pub event: String,
    pub payload: Value,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_ref: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row change pushed by the feed
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeEvent {
    pub table: String,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    #[serde(default)]
    pub record: Option<Value>,
    #[serde(default)]
    pub old_record: Option<Value>,
    #[serde(default)]
    pub commit_timestamp: Option<String>,
}

#[derive(Deserialize)]
struct ChangePayload {
    data: ChangeEvent,
}

#[derive(Deserialize)]
struct ReplyPayload {
    status: String,
    #[serde(default)]
    response: Value,
}

pub type ChangeHandler = Rc<dyn Fn(ChangeEvent)>;

struct Channel {
    table: String,
    join_ref: String,
    handler: ChangeHandler,
}

/// What an inbound frame meant
pub enum Inbound {
    /// A row changed; invoke the handler outside any borrow of the registry
    Change(ChangeHandler, ChangeEvent),
    Joined(String),
    Rejected { topic: String, reason: String },
    Closed(String),
    Ignored,
}

/// Channel bookkeeping for one socket
pub struct ChannelRegistry {
    access_token: String,
    connected: bool,
    next_ref: u64,
    channels: BTreeMap<String, Channel>,
    outbox: VecDeque<String>,
}

pub fn topic_for(name: &str) -> String {
    format!("realtime:{}", name)
}

impl ChannelRegistry {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            connected: false,
            next_ref: 0,
            channels: BTreeMap::new(),
            outbox: VecDeque::new(),
        }
    }

    /// Socket state as reported by the transport
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn next_ref(&mut self) -> String {
        self.next_ref += 1;
        self.next_ref.to_string()
    }

    fn push(&mut self, frame: &Frame) -> Result<(), RealtimeError> {
        self.outbox.push_back(serde_json::to_string(frame)?);
        Ok(())
    }

    /// Join channel `name` listening to every change on `table`.
    ///
    /// Joining an existing channel replaces its handler and rejoins.
    pub fn join(&mut self, name: &str, table: &str, handler: ChangeHandler) -> Result<String, RealtimeError> {
        let topic = topic_for(name);
        let join_ref = self.next_ref();
        let frame = Frame {
            topic: topic.clone(),
            event: EVENT_JOIN.to_string(),
            payload: json!({
                "config": {
                    "broadcast": { "ack": false, "self": false },
                    "presence": { "key": "" },
                    "postgres_changes": [
                        { "event": "*", "schema": "public", "table": table }
                    ],
                    "private": false
                },
                "access_token": self.access_token,
            }),
            reference: Some(join_ref.clone()),
            join_ref: Some(join_ref.clone()),
        };
        self.push(&frame)?;
        self.channels.insert(
            topic.clone(),
            Channel {
                table: table.to_string(),
                join_ref,
                handler,
            },
        );
        Ok(topic)
    }

    /// Leave a channel; its handler is dropped immediately
    pub fn leave(&mut self, topic: &str) -> Result<bool, RealtimeError> {
        let Some(channel) = self.channels.remove(topic) else {
            return Ok(false);
        };
        let reference = self.next_ref();
        self.push(&Frame {
            topic: topic.to_string(),
            event: EVENT_LEAVE.to_string(),
            payload: json!({}),
            reference: Some(reference),
            join_ref: Some(channel.join_ref),
        })?;
        Ok(true)
    }

    pub fn leave_all(&mut self) -> Result<(), RealtimeError> {
        let topics: Vec<String> = self.channels.keys().cloned().collect();
        for topic in topics {
            self.leave(&topic)?;
        }
        Ok(())
    }

    /// Queue a heartbeat; nothing is queued while disconnected
    pub fn heartbeat(&mut self) -> Result<(), RealtimeError> {
        if !self.connected {
            return Ok(());
        }
        let reference = self.next_ref();
        self.push(&Frame {
            topic: PHOENIX_TOPIC.to_string(),
            event: EVENT_HEARTBEAT.to_string(),
            payload: json!({}),
            reference: Some(reference),
            join_ref: None,
        })
    }

    /// Take the queued frames, oldest first
    pub fn drain_outbox(&mut self) -> Vec<String> {
        self.outbox.drain(..).collect()
    }

    /// Decode one inbound text frame
    pub fn receive(&mut self, text: &str) -> Result<Inbound, RealtimeError> {
        let frame: Frame = serde_json::from_str(text)?;
        let Some(channel) = self.channels.get(&frame.topic) else {
            return Ok(Inbound::Ignored);
        };

        match frame.event.as_str() {
            EVENT_POSTGRES_CHANGES => {
                let payload: ChangePayload = serde_json::from_value(frame.payload)?;
                if payload.data.table != channel.table {
                    return Ok(Inbound::Ignored);
                }
                Ok(Inbound::Change(channel.handler.clone(), payload.data))
            }
            EVENT_REPLY if frame.reference.as_deref() == Some(channel.join_ref.as_str()) => {
                let reply: ReplyPayload = serde_json::from_value(frame.payload)?;
                if reply.status == "ok" {
                    Ok(Inbound::Joined(frame.topic))
                } else {
                    Ok(Inbound::Rejected {
                        topic: frame.topic,
                        reason: reply.response.to_string(),
                    })
                }
            }
            EVENT_ERROR | EVENT_CLOSE => Ok(Inbound::Closed(frame.topic)),
            _ => Ok(Inbound::Ignored),
        }
    }
}
