//! Realtime Socket
//!
//! Browser WebSocket transport for `ChannelRegistry`. Frames queued before the
//! socket opens are flushed on `open`; a heartbeat keeps the connection alive
//! while it is open.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use super::realtime::{ChangeEvent, ChannelRegistry, Inbound};
use crate::config::BackendConfig;
use crate::error::RealtimeError;

const HEARTBEAT_MS: u32 = 25_000;

struct Inner {
    registry: ChannelRegistry,
    socket: WebSocket,
}

/// One multiplexed realtime connection
pub struct RealtimeClient {
    inner: Rc<RefCell<Inner>>,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(Event)>,
    _heartbeat: Interval,
}

fn flush(inner: &Rc<RefCell<Inner>>) {
    let (socket, frames) = {
        let mut inner = inner.borrow_mut();
        if !inner.registry.is_connected() {
            return;
        }
        (inner.socket.clone(), inner.registry.drain_outbox())
    };
    for frame in frames {
        if let Err(e) = socket.send_with_str(&frame) {
            log::warn!("[REALTIME] send failed: {:?}", e);
        }
    }
}

fn handle_frame(inner: &Rc<RefCell<Inner>>, text: &str) {
    let inbound = inner.borrow_mut().registry.receive(text);
    match inbound {
        Ok(Inbound::Change(handler, event)) => {
            log::debug!("[REALTIME] {:?} on {}", event.kind, event.table);
            handler(event);
        }
        Ok(Inbound::Joined(topic)) => log::info!("[REALTIME] joined {}", topic),
        Ok(Inbound::Rejected { topic, reason }) => {
            log::warn!("[REALTIME] join of {} rejected: {}", topic, reason)
        }
        Ok(Inbound::Closed(topic)) => log::warn!("[REALTIME] channel {} closed", topic),
        Ok(Inbound::Ignored) => {}
        Err(e) => log::warn!("[REALTIME] {}", e),
    }
}

impl RealtimeClient {
    pub fn connect(config: &BackendConfig) -> Result<Self, RealtimeError> {
        let socket = WebSocket::new(&config.realtime_url())
            .map_err(|e| RealtimeError::Socket(format!("{:?}", e)))?;
        let inner = Rc::new(RefCell::new(Inner {
            registry: ChannelRegistry::new(config.anon_key.clone()),
            socket: socket.clone(),
        }));

        let on_open = {
            let inner = inner.clone();
            Closure::<dyn FnMut()>::new(move || {
                inner.borrow_mut().registry.set_connected(true);
                log::info!("[REALTIME] connected");
                flush(&inner);
            })
        };
        let on_message = {
            let inner = inner.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
                if let Some(text) = ev.data().as_string() {
                    handle_frame(&inner, &text);
                }
            })
        };
        let on_close = {
            let inner = inner.clone();
            Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
                inner.borrow_mut().registry.set_connected(false);
                log::warn!("[REALTIME] socket closed (code {})", ev.code());
            })
        };
        let on_error = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            log::error!("[REALTIME] socket error");
        });

        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        socket.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        let heartbeat = {
            let inner = inner.clone();
            Interval::new(HEARTBEAT_MS, move || {
                let queued = inner.borrow_mut().registry.heartbeat();
                if let Err(e) = queued {
                    log::warn!("[REALTIME] {}", e);
                }
                flush(&inner);
            })
        };

        Ok(Self {
            inner,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
            _on_error: on_error,
            _heartbeat: heartbeat,
        })
    }

    /// Listen to every change on `table` under channel `name`
    pub fn subscribe(
        &self,
        name: &str,
        table: &str,
        handler: impl Fn(ChangeEvent) + 'static,
    ) -> Result<String, RealtimeError> {
        let topic = self.inner.borrow_mut().registry.join(name, table, Rc::new(handler))?;
        flush(&self.inner);
        Ok(topic)
    }

    /// Leave every channel, detach the socket callbacks and close it.
    ///
    /// Consuming `self` drops the heartbeat and the JS closures.
    pub fn disconnect(self) {
        let left = self.inner.borrow_mut().registry.leave_all();
        if let Err(e) = left {
            log::warn!("[REALTIME] {}", e);
        }
        flush(&self.inner);

        let inner = self.inner.borrow();
        inner.socket.set_onopen(None);
        inner.socket.set_onmessage(None);
        inner.socket.set_onclose(None);
        inner.socket.set_onerror(None);
        if let Err(e) = inner.socket.close() {
            log::warn!("[REALTIME] close failed: {:?}", e);
        }
        log::info!("[REALTIME] disconnected");
    }
}
