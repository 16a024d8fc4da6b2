//! Avatar Component
//!
//! Profile picture for a handle with a local fallback, optionally wrapped in
//! a link to the profile.

use leptos::prelude::*;

use crate::config::AvatarSettings;

/// Round avatar; swaps to the fallback image once if the remote one fails
#[component]
pub fn Avatar(
    #[prop(into)] handle: String,
    #[prop(optional, into)] class: Option<String>,
    /// Wrap in a profile link opening in a new tab
    #[prop(optional)]
    linked: bool,
) -> impl IntoView {
    let avatars = AvatarSettings::default();
    let (src, set_src) = signal(avatars.avatar_url(&handle));
    let fallback = avatars.fallback;
    let class = class.unwrap_or_else(|| "avatar".to_string());

    let img = view! {
        <img
            class=class
            src=move || src.get()
            alt=handle.clone()
            on:error=move |_| {
                if src.get_untracked() != fallback {
                    set_src.set(fallback.to_string());
                }
            }
        />
    };

    if linked {
        view! {
            <a href=avatars.profile_url(&handle) target="_blank" rel="noopener noreferrer">
                {img}
            </a>
        }
        .into_any()
    } else {
        img.into_any()
    }
}

/// `@handle` linking to the profile in a new tab
#[component]
pub fn HandleLink(#[prop(into)] handle: String) -> impl IntoView {
    let href = AvatarSettings::default().profile_url(&handle);
    view! {
        <a class="handle-link" href=href target="_blank" rel="noopener noreferrer">
            {format!("@{}", handle)}
        </a>
    }
}
