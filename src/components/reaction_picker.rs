//! Reaction Picker Component
//!
//! Glyph chips with counts plus a palette popover. Clicks update the local
//! tally right away and fire the store write; the next fetch replaces the
//! tally with the authoritative one.

use leptos::prelude::*;

use crate::hooks::MapData;
use crate::models::Reaction;
use crate::reactions::{ReactionTally, EMOJI_PALETTE};

#[component]
pub fn ReactionPicker(
    #[prop(into)] note_id: String,
    #[prop(into)] reactions: Signal<Vec<Reaction>>,
    /// Fetch counter; an identical re-fetch must still drop optimistic counts
    #[prop(into)]
    revision: Signal<u64>,
) -> impl IntoView {
    let data = expect_context::<MapData>();
    let tally = RwSignal::new(ReactionTally::default());
    let (palette_open, set_palette_open) = signal(false);

    // Re-seed on every fetch
    Effect::new(move |_| {
        revision.track();
        tally.set(reactions.with(|r| ReactionTally::from_reactions(r)));
    });

    let note_id = StoredValue::new(note_id);
    let pick = move |emoji: String| {
        let intent = reactions.with_untracked(|r| data.toggle_reaction(r, note_id.get_value(), emoji.clone()));
        tally.update(|t| t.apply(&emoji, intent));
        set_palette_open.set(false);
    };

    view! {
        <div class="reaction-picker">
            <For
                each=move || tally.with(|t| t.entries().to_vec())
                key=|(emoji, count)| (emoji.clone(), *count)
                children=move |(emoji, count)| {
                    let glyph = emoji.clone();
                    view! {
                        <button
                            type="button"
                            class="reaction-chip"
                            on:click=move |ev| {
                                ev.stop_propagation();
                                pick(glyph.clone());
                            }
                        >
                            {format!("{} {}", emoji, count)}
                        </button>
                    }
                }
            />

            <div class="reaction-add">
                <button
                    type="button"
                    class="reaction-chip"
                    on:click=move |ev| {
                        ev.stop_propagation();
                        set_palette_open.update(|open| *open = !*open);
                    }
                >
                    "+ 😊"
                </button>
                <Show when=move || palette_open.get()>
                    <div class="reaction-palette">
                        {EMOJI_PALETTE
                            .iter()
                            .map(|emoji| {
                                let glyph = emoji.to_string();
                                view! {
                                    <button
                                        type="button"
                                        class="palette-glyph"
                                        on:click=move |ev| {
                                            ev.stop_propagation();
                                            pick(glyph.clone());
                                        }
                                    >
                                        {*emoji}
                                    </button>
                                }
                            })
                            .collect_view()}
                    </div>
                </Show>
            </div>
        </div>
    }
}
