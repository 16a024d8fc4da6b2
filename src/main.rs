//! Pinboard Map Entry Point

mod app;
mod backend;
mod components;
mod config;
mod context;
mod error;
mod form;
mod hooks;
mod map;
mod models;
mod page;
mod reactions;
mod store;
mod sync;
mod time_ago;
mod toast;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_logger::init(log::LevelFilter::Info) {
        web_sys::console::warn_1(&format!("logger already set: {}", e).into());
    }
    log::info!("[APP] starting");
    mount_to_body(App);
}
