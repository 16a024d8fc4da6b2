//! Interactive Map Component
//!
//! Mounts the Leaflet surface, keeps markers in step with the store, routes
//! clicks by page mode and renders the active note's popup as an overlay.

use std::rc::Rc;

use leptos::html;
use leptos::prelude::*;

use crate::components::NoteCard;
use crate::config::{AvatarSettings, MapSettings};
use crate::context::use_page_context;
use crate::map::{route_click, ClickOutcome, LayerKind, LeafletSurface, MapController, MapEvent};
use crate::store::{store_find_note, use_app_store, AppStateStoreFields};

type Controller = MapController<LeafletSurface>;

#[component]
pub fn InteractiveMap() -> impl IntoView {
    let store = use_app_store();
    let page = use_page_context();
    let container = NodeRef::<html::Div>::new();
    let controller: StoredValue<Option<Controller>, LocalStorage> = StoredValue::new_local(None);

    let (ready, set_ready) = signal(false);
    let (clustering, set_clustering) = signal(false);
    let (layer, set_layer) = signal(LayerKind::Flat);
    // Bumped on pan/zoom/resize so the popup re-projects
    let (view_tick, set_view_tick) = signal(0u32);
    let (map_error, set_map_error) = signal(None::<String>);

    // Mount once the container is in the DOM
    Effect::new(move |_| {
        let Some(el) = container.get() else {
            return;
        };
        if controller.with_value(|c| c.is_some()) {
            return;
        }
        let surface = match LeafletSurface::mount(&el, &MapSettings::default()) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("[MAP] {}", e);
                set_map_error.set(Some(e.to_string()));
                return;
            }
        };

        let mut ctrl = MapController::new(surface, AvatarSettings::default());
        ctrl.attach(Rc::new(move |event| match event {
            MapEvent::Click(position) => {
                match route_click(page.mode.get_untracked().is_placing(), position) {
                    ClickOutcome::PlacePin(position) => page.map_clicked(position),
                    ClickOutcome::ClosePopup => page.close_popup(),
                }
            }
            MapEvent::MarkerClick(note_id) => {
                if !page.mode.get_untracked().is_placing() {
                    page.open_popup(note_id);
                }
            }
            MapEvent::ViewChanged => set_view_tick.update(|t| *t = t.wrapping_add(1)),
        }));
        set_clustering.set(ctrl.supports_clustering());
        controller.set_value(Some(ctrl));
        set_ready.set(true);
    });

    // Full marker rebuild on every collection change
    Effect::new(move |_| {
        if !ready.get() {
            return;
        }
        store.notes().with(|notes| {
            controller.update_value(|c| {
                if let Some(c) = c {
                    c.reconcile(notes);
                }
            });
        });
    });

    Effect::new(move |_| {
        if !ready.get() {
            return;
        }
        let placing = page.mode.get().is_placing();
        controller.update_value(|c| {
            if let Some(c) = c {
                c.set_placing(placing);
            }
        });
    });

    on_cleanup(move || {
        controller.try_update_value(|c| {
            if let Some(c) = c {
                c.teardown();
            }
        });
    });

    let active = Memo::new(move |_| page.active_note.get().and_then(|id| store_find_note(&store, &id)));
    // Card content only rebuilds when a different note opens
    let active_id = Memo::new(move |_| active.with(|n| n.as_ref().map(|n| n.note.id.clone())));

    let layout = move || {
        view_tick.track();
        let position = active.with(|n| n.as_ref().and_then(|n| n.note.position()))?;
        controller
            .try_with_value(|c| c.as_ref().and_then(|c| c.popup_layout(position)))
            .flatten()
    };

    let toggle = move |_| {
        let next = controller
            .try_update_value(|c| c.as_mut().map(|c| c.toggle_clustering()))
            .flatten();
        if let Some(next) = next {
            set_layer.set(next);
        }
    };

    view! {
        <div class="map-shell">
            <div class="map-container" node_ref=container></div>

            {move || map_error.get().map(|e| view! { <div class="map-error">{format!("Map unavailable: {}", e)}</div> })}

            <Show when=move || clustering.get()>
                <div class="view-toggle glass">
                    <span class:active=move || layer.get() == LayerKind::Flat>{LayerKind::Flat.label()}</span>
                    <label class="switch">
                        <input
                            type="checkbox"
                            prop:checked=move || layer.get() == LayerKind::Cluster
                            on:change=toggle
                        />
                        <span class="slider"></span>
                    </label>
                    <span class:active=move || layer.get() == LayerKind::Cluster>{LayerKind::Cluster.label()}</span>
                </div>
            </Show>

            <Show when=move || layout().is_some()>
                <div
                    class=move || {
                        let placement = layout().map(|l| l.placement.class()).unwrap_or_default();
                        format!("note-popup glass {}", placement)
                    }
                    style=move || {
                        layout()
                            .map(|l| format!("left: {}px; top: {}px;", l.left, l.top))
                            .unwrap_or_default()
                    }
                    on:click=|ev| ev.stop_propagation()
                >
                    <button class="popup-close" on:click=move |_| page.close_popup()>"×"</button>
                    {move || active_id.get().and_then(|_| active.get_untracked()).map(|note| view! { <NoteCard note=note /> })}
                </div>
            </Show>
        </div>
    }
}
