//! Toast Notifications
//!
//! Transient success/failure messages shown in a corner stack.

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

const DISMISS_MS: u32 = 4_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: "Success".to_string(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            id: 0,
            title: "Error".to_string(),
            description: description.into(),
            variant: ToastVariant::Destructive,
        }
    }
}

/// Sink for user-visible notifications
pub trait Notifier {
    fn notify(&self, toast: Toast);
}

/// Toast list provided via context
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: RwSignal<u32>,
}

impl Toasts {
    /// Create the toast list and provide it to children
    pub fn provide() -> Self {
        let toasts = Self {
            items: RwSignal::new(Vec::new()),
            next_id: RwSignal::new(0),
        };
        provide_context(toasts);
        toasts
    }

    pub fn dismiss(&self, id: u32) {
        self.items.try_update(|items| items.retain(|t| t.id != id));
    }
}

impl Notifier for Toasts {
    fn notify(&self, mut toast: Toast) {
        let Some(id) = self.next_id.try_update(|n| {
            *n += 1;
            *n
        }) else {
            return;
        };
        toast.id = id;
        self.items.try_update(|items| items.push(toast));

        let toasts = *self;
        Timeout::new(DISMISS_MS, move || toasts.dismiss(id)).forget();
    }
}

pub fn use_toasts() -> Toasts {
    expect_context::<Toasts>()
}

/// Stack of live toasts, newest at the bottom
#[component]
pub fn ToastStack() -> impl IntoView {
    let toasts = use_toasts();

    view! {
        <div class="toast-stack">
            <For
                each=move || toasts.items.get()
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    let class = match toast.variant {
                        ToastVariant::Default => "toast",
                        ToastVariant::Destructive => "toast destructive",
                    };
                    view! {
                        <div class=class role="status">
                            <div class="toast-text">
                                <strong>{toast.title}</strong>
                                <p>{toast.description}</p>
                            </div>
                            <button class="toast-close" on:click=move |_| toasts.dismiss(id)>"×"</button>
                        </div>
                    }
                }
            />
        </div>
    }
}
