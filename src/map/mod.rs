//! Map Lifecycle
//!
//! `MapSurface` is the drawing seam (Leaflet in the browser, a fake in tests).
//! `MapController` owns everything that must be undone on unmount: listeners,
//! markers and the surface itself.

mod leaflet;
mod marker;
mod popup;

use std::rc::Rc;

use crate::config::AvatarSettings;
use crate::models::{LatLng, NoteWithReactions};

pub use leaflet::LeafletSurface;
pub use marker::{cluster_icon_html, cluster_size_class, MarkerSpec};
pub use popup::{place_popup, PopupLayout, ScreenPoint, ScreenSize, MARKER_RADIUS, POPUP_SIZE};

/// Marker layer currently on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Flat,
    Cluster,
}

impl LayerKind {
    pub fn label(&self) -> &'static str {
        match self {
            LayerKind::Flat => "Avatar View",
            LayerKind::Cluster => "Cluster View",
        }
    }

    pub fn other(self) -> Self {
        match self {
            LayerKind::Flat => LayerKind::Cluster,
            LayerKind::Cluster => LayerKind::Flat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    Click,
    MarkerClick,
    Move,
    Zoom,
    Resize,
}

pub const ALL_EVENT_KINDS: [MapEventKind; 5] = [
    MapEventKind::Click,
    MapEventKind::MarkerClick,
    MapEventKind::Move,
    MapEventKind::Zoom,
    MapEventKind::Resize,
];

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Empty map area clicked
    Click(LatLng),
    /// Marker of the given note clicked
    MarkerClick(String),
    /// Pan, zoom or container resize
    ViewChanged,
}

pub type MapHandler = Rc<dyn Fn(MapEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Crosshair,
    Grab,
}

impl Cursor {
    pub fn css(&self) -> &'static str {
        match self {
            Cursor::Crosshair => "crosshair",
            Cursor::Grab => "grab",
        }
    }
}

/// What a map click means in the current mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    PlacePin(LatLng),
    ClosePopup,
}

pub fn route_click(placing: bool, position: LatLng) -> ClickOutcome {
    if placing {
        ClickOutcome::PlacePin(position)
    } else {
        ClickOutcome::ClosePopup
    }
}

/// Drawing surface with two marker layers (flat and clustered twins)
pub trait MapSurface {
    fn supports_clustering(&self) -> bool;
    /// Add to the flat layer and, when present, the cluster layer
    fn add_marker(&mut self, marker: &MarkerSpec);
    /// Remove every marker from both layers
    fn clear_markers(&mut self);
    fn show_layer(&mut self, layer: LayerKind);
    fn hide_layer(&mut self, layer: LayerKind);
    fn listen(&mut self, kind: MapEventKind, handler: MapHandler) -> ListenerId;
    fn unlisten(&mut self, id: ListenerId);
    fn set_cursor(&mut self, cursor: Cursor);
    /// Container coordinates of `position`
    fn project(&self, position: LatLng) -> Option<ScreenPoint>;
    fn viewport(&self) -> ScreenSize;
    fn destroy(&mut self);
}

pub struct MapController<S: MapSurface> {
    surface: S,
    avatars: AvatarSettings,
    layer: LayerKind,
    listeners: Vec<ListenerId>,
    markers: Vec<MarkerSpec>,
    live: bool,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(mut surface: S, avatars: AvatarSettings) -> Self {
        surface.show_layer(LayerKind::Flat);
        surface.set_cursor(Cursor::Grab);
        Self {
            surface,
            avatars,
            layer: LayerKind::Flat,
            listeners: Vec::new(),
            markers: Vec::new(),
            live: true,
        }
    }

    /// Route every map event kind to `handler`
    pub fn attach(&mut self, handler: MapHandler) {
        if !self.live {
            return;
        }
        for kind in ALL_EVENT_KINDS {
            let id = self.surface.listen(kind, handler.clone());
            self.listeners.push(id);
        }
    }

    /// Drop every marker and rebuild from `notes`; returns the marker count
    pub fn reconcile(&mut self, notes: &[NoteWithReactions]) -> usize {
        if !self.live {
            return 0;
        }
        self.surface.clear_markers();
        self.markers = notes
            .iter()
            .filter_map(|n| MarkerSpec::from_note(n, &self.avatars))
            .collect();
        for marker in &self.markers {
            self.surface.add_marker(marker);
        }
        log::debug!("[MAP] rendered {} markers for {} notes", self.markers.len(), notes.len());
        self.markers.len()
    }

    pub fn set_placing(&mut self, placing: bool) {
        if !self.live {
            return;
        }
        self.surface
            .set_cursor(if placing { Cursor::Crosshair } else { Cursor::Grab });
    }

    pub fn supports_clustering(&self) -> bool {
        self.surface.supports_clustering()
    }

    /// Swap the visible layer for its twin; markers stay on both
    pub fn toggle_clustering(&mut self) -> LayerKind {
        if !self.live || !self.surface.supports_clustering() {
            return self.layer;
        }
        let next = self.layer.other();
        self.surface.hide_layer(self.layer);
        self.surface.show_layer(next);
        self.layer = next;
        next
    }

    /// Popup box for a marker at `position`, kept inside the container
    pub fn popup_layout(&self, position: LatLng) -> Option<PopupLayout> {
        if !self.live {
            return None;
        }
        let anchor = self.surface.project(position)?;
        Some(place_popup(anchor, POPUP_SIZE, self.surface.viewport(), MARKER_RADIUS))
    }

    /// Detach listeners, drop markers and destroy the surface. Idempotent.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        for id in self.listeners.drain(..) {
            self.surface.unlisten(id);
        }
        self.surface.clear_markers();
        self.markers.clear();
        self.surface.destroy();
        self.live = false;
        log::debug!("[MAP] torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::popup::Placement;
    use super::*;
    use crate::sync::join_reactions;
    use crate::sync::tests::note;
    use std::cell::{Cell, RefCell};
    use std::collections::{BTreeMap, HashSet};

    #[derive(Default)]
    struct FakeState {
        clustering: bool,
        flat: Vec<LatLng>,
        cluster: Vec<LatLng>,
        shown: HashSet<LayerKind>,
        listeners: BTreeMap<ListenerId, (MapEventKind, MapHandler)>,
        next_id: u32,
        cursor: Option<Cursor>,
        destroyed: bool,
    }

    #[derive(Clone, Default)]
    struct FakeSurface(Rc<RefCell<FakeState>>);

    impl FakeSurface {
        fn with_clustering() -> Self {
            let surface = Self::default();
            surface.0.borrow_mut().clustering = true;
            surface
        }

        fn emit(&self, kind: MapEventKind, event: MapEvent) {
            let handlers: Vec<MapHandler> = self
                .0
                .borrow()
                .listeners
                .values()
                .filter(|(k, _)| *k == kind)
                .map(|(_, h)| h.clone())
                .collect();
            for handler in handlers {
                handler(event.clone());
            }
        }

        /// Positions on the visible layer(s), sorted for comparison
        fn rendered(&self) -> Vec<(i64, i64)> {
            let state = self.0.borrow();
            let mut out: Vec<(i64, i64)> = Vec::new();
            if state.shown.contains(&LayerKind::Flat) {
                out.extend(state.flat.iter().map(key));
            }
            if state.shown.contains(&LayerKind::Cluster) {
                out.extend(state.cluster.iter().map(key));
            }
            out.sort();
            out
        }
    }

    fn key(p: &LatLng) -> (i64, i64) {
        ((p.lat * 1e6) as i64, (p.lng * 1e6) as i64)
    }

    impl MapSurface for FakeSurface {
        fn supports_clustering(&self) -> bool {
            self.0.borrow().clustering
        }

        fn add_marker(&mut self, marker: &MarkerSpec) {
            let mut state = self.0.borrow_mut();
            state.flat.push(marker.position);
            if state.clustering {
                state.cluster.push(marker.position);
            }
        }

        fn clear_markers(&mut self) {
            let mut state = self.0.borrow_mut();
            state.flat.clear();
            state.cluster.clear();
        }

        fn show_layer(&mut self, layer: LayerKind) {
            let mut state = self.0.borrow_mut();
            if layer == LayerKind::Cluster && !state.clustering {
                return;
            }
            state.shown.insert(layer);
        }

        fn hide_layer(&mut self, layer: LayerKind) {
            self.0.borrow_mut().shown.remove(&layer);
        }

        fn listen(&mut self, kind: MapEventKind, handler: MapHandler) -> ListenerId {
            let mut state = self.0.borrow_mut();
            state.next_id += 1;
            let id = ListenerId(state.next_id);
            state.listeners.insert(id, (kind, handler));
            id
        }

        fn unlisten(&mut self, id: ListenerId) {
            self.0.borrow_mut().listeners.remove(&id);
        }

        fn set_cursor(&mut self, cursor: Cursor) {
            self.0.borrow_mut().cursor = Some(cursor);
        }

        fn project(&self, position: LatLng) -> Option<ScreenPoint> {
            Some(ScreenPoint {
                x: 600.0 + position.lng,
                y: 400.0 - position.lat,
            })
        }

        fn viewport(&self) -> ScreenSize {
            ScreenSize { width: 1200.0, height: 800.0 }
        }

        fn destroy(&mut self) {
            self.0.borrow_mut().destroyed = true;
        }
    }

    fn sample_notes() -> Vec<NoteWithReactions> {
        join_reactions(
            vec![
                note("a", Some(10.0), Some(20.0)),
                note("b", Some(-33.9), Some(151.2)),
                note("c", None, Some(5.0)),
                note("d", Some(5.0), None),
                note("e", Some(51.5), Some(-0.1)),
            ],
            vec![],
        )
    }

    #[test]
    fn test_reconcile_renders_only_located_notes() {
        let surface = FakeSurface::with_clustering();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());

        assert_eq!(controller.reconcile(&sample_notes()), 3);
        assert_eq!(surface.0.borrow().flat.len(), 3);
        assert_eq!(surface.0.borrow().cluster.len(), 3);
    }

    #[test]
    fn test_reconcile_rebuilds_instead_of_accumulating() {
        let surface = FakeSurface::with_clustering();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        controller.reconcile(&sample_notes());
        controller.reconcile(&sample_notes()[..1]);
        assert_eq!(surface.0.borrow().flat.len(), 1);
    }

    #[test]
    fn test_toggle_keeps_rendered_positions() {
        let surface = FakeSurface::with_clustering();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        controller.reconcile(&sample_notes());
        let before = surface.rendered();
        assert_eq!(before.len(), 3);

        assert_eq!(controller.toggle_clustering(), LayerKind::Cluster);
        assert_eq!(surface.rendered(), before);
        assert!(!surface.0.borrow().shown.contains(&LayerKind::Flat));

        assert_eq!(controller.toggle_clustering(), LayerKind::Flat);
        assert_eq!(surface.rendered(), before);
    }

    #[test]
    fn test_toggle_without_clustering_is_noop() {
        let surface = FakeSurface::default();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        controller.reconcile(&sample_notes());
        let before = surface.rendered();

        assert!(!controller.supports_clustering());
        assert_eq!(controller.toggle_clustering(), LayerKind::Flat);
        assert_eq!(surface.rendered(), before);
    }

    #[test]
    fn test_placing_switches_cursor() {
        let surface = FakeSurface::default();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        assert_eq!(surface.0.borrow().cursor, Some(Cursor::Grab));
        controller.set_placing(true);
        assert_eq!(surface.0.borrow().cursor, Some(Cursor::Crosshair));
        controller.set_placing(false);
        assert_eq!(surface.0.borrow().cursor, Some(Cursor::Grab));
    }

    #[test]
    fn test_attach_routes_events() {
        let surface = FakeSurface::default();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        controller.attach(Rc::new(move |ev| sink.borrow_mut().push(ev)));

        surface.emit(MapEventKind::Click, MapEvent::Click(LatLng::new(1.0, 2.0)));
        surface.emit(MapEventKind::MarkerClick, MapEvent::MarkerClick("a".to_string()));
        surface.emit(MapEventKind::Zoom, MapEvent::ViewChanged);

        assert_eq!(
            *seen.borrow(),
            vec![
                MapEvent::Click(LatLng::new(1.0, 2.0)),
                MapEvent::MarkerClick("a".to_string()),
                MapEvent::ViewChanged,
            ]
        );
    }

    #[test]
    fn test_teardown_detaches_every_listener() {
        let surface = FakeSurface::with_clustering();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        controller.attach(Rc::new(move |_| counter.set(counter.get() + 1)));
        controller.reconcile(&sample_notes());

        controller.teardown();
        for kind in ALL_EVENT_KINDS {
            surface.emit(kind, MapEvent::ViewChanged);
        }

        assert_eq!(fired.get(), 0);
        let state = surface.0.borrow();
        assert!(state.listeners.is_empty());
        assert!(state.flat.is_empty() && state.cluster.is_empty());
        assert!(state.destroyed);
    }

    #[test]
    fn test_controller_is_inert_after_teardown() {
        let surface = FakeSurface::default();
        let mut controller = MapController::new(surface.clone(), AvatarSettings::default());
        controller.teardown();
        controller.teardown();

        assert_eq!(controller.reconcile(&sample_notes()), 0);
        assert!(surface.0.borrow().flat.is_empty());
        assert_eq!(controller.popup_layout(LatLng::new(0.0, 0.0)), None);
    }

    #[test]
    fn test_route_click_by_mode() {
        let here = LatLng::new(3.0, 4.0);
        assert_eq!(route_click(true, here), ClickOutcome::PlacePin(here));
        assert_eq!(route_click(false, here), ClickOutcome::ClosePopup);
    }

    #[test]
    fn test_popup_layout_projects_marker() {
        let controller = MapController::new(FakeSurface::default(), AvatarSettings::default());
        let layout = controller.popup_layout(LatLng::new(0.0, 0.0)).unwrap();
        assert_eq!(layout.placement, Placement::Above);
        assert_eq!(layout.left, 450.0);
        assert_eq!(layout.top, 140.0);
    }
}
