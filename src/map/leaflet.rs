//! Leaflet-backed `MapSurface`

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use leaflet_bindings as lf;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::{Cursor, LayerKind, ListenerId, MapEvent, MapEventKind, MapHandler, MapSurface, MarkerSpec, ScreenPoint, ScreenSize};
use crate::config::MapSettings;
use crate::error::MapError;
use crate::models::LatLng;

const MARKER_PX: u32 = 40;
const CLUSTER_PX: u32 = 40;

type MarkerHandlers = Rc<RefCell<BTreeMap<ListenerId, MapHandler>>>;

struct MarkerEntry {
    flat: lf::Marker,
    twin: Option<lf::Marker>,
    on_click: Closure<dyn Fn(JsValue)>,
}

pub struct LeafletSurface {
    map: lf::Map,
    flat: lf::LayerGroup,
    cluster: Option<lf::LayerGroup>,
    // Keeps the icon callback alive for as long as the cluster group exists
    _cluster_icon: Option<Closure<dyn Fn(lf::MarkerCluster) -> JsValue>>,
    map_listeners: BTreeMap<ListenerId, (&'static str, Closure<dyn Fn(JsValue)>)>,
    marker_handlers: MarkerHandlers,
    markers: Vec<MarkerEntry>,
    next_id: u32,
    destroyed: bool,
}

fn init_err(e: JsValue) -> MapError {
    MapError::Init(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
}

fn cluster_icon(cluster: lf::MarkerCluster) -> JsValue {
    let count = cluster.get_child_count();
    let options = lf::DivIconOptions {
        html: super::cluster_icon_html(count),
        class_name: super::cluster_size_class(count).to_string(),
        icon_size: [CLUSTER_PX, CLUSTER_PX],
        icon_anchor: [CLUSTER_PX / 2, CLUSTER_PX / 2],
    };
    match lf::div_icon(&options) {
        Ok(icon) => icon.into(),
        Err(e) => {
            log::warn!("[MAP] cluster icon failed: {:?}", e);
            JsValue::UNDEFINED
        }
    }
}

impl LeafletSurface {
    /// Create the map inside `container`
    pub fn mount(container: &web_sys::HtmlElement, settings: &MapSettings) -> Result<Self, MapError> {
        if !lf::is_available() {
            return Err(MapError::LeafletMissing);
        }

        let map = lf::map(
            container,
            &lf::MapOptions {
                center: settings.center,
                zoom: settings.zoom,
                min_zoom: settings.min_zoom,
                max_bounds: settings.max_bounds,
                max_bounds_viscosity: settings.max_bounds_viscosity,
                zoom_control: false,
            },
        )
        .map_err(init_err)?;

        lf::zoom_control(&lf::ZoomControlOptions {
            position: settings.zoom_control_position.to_string(),
        })
        .map_err(init_err)?
        .add_to(&map);

        let tiles = lf::tile_layer(
            settings.tile_url,
            &lf::TileLayerOptions {
                attribution: settings.tile_attribution.to_string(),
                subdomains: settings.tile_subdomains.to_string(),
                max_zoom: settings.max_zoom,
            },
        )
        .map_err(init_err)?;
        map.add_layer(&tiles);

        let flat = lf::layer_group();

        let icon_closure: Closure<dyn Fn(lf::MarkerCluster) -> JsValue> = Closure::new(cluster_icon);
        let cluster = lf::marker_cluster_group(
            &lf::ClusterOptions {
                max_cluster_radius: settings.max_cluster_radius,
                show_coverage_on_hover: false,
            },
            icon_closure.as_ref().unchecked_ref(),
        )
        .map_err(init_err)?;
        let cluster_icon = cluster.as_ref().map(|_| icon_closure);

        log::info!(
            "[MAP] leaflet ready (clustering {})",
            if cluster.is_some() { "available" } else { "unavailable" }
        );

        Ok(Self {
            map,
            flat,
            cluster,
            _cluster_icon: cluster_icon,
            map_listeners: BTreeMap::new(),
            marker_handlers: Rc::new(RefCell::new(BTreeMap::new())),
            markers: Vec::new(),
            next_id: 0,
            destroyed: false,
        })
    }

    fn group(&self, layer: LayerKind) -> Option<&lf::LayerGroup> {
        match layer {
            LayerKind::Flat => Some(&self.flat),
            LayerKind::Cluster => self.cluster.as_ref(),
        }
    }

    fn new_marker(spec: &MarkerSpec) -> Result<lf::Marker, JsValue> {
        let icon = lf::div_icon(&lf::DivIconOptions {
            html: spec.icon_html(),
            class_name: "avatar-marker".to_string(),
            icon_size: [MARKER_PX, MARKER_PX],
            icon_anchor: [MARKER_PX / 2, MARKER_PX / 2],
        })?;
        lf::marker(
            spec.position.lat,
            spec.position.lng,
            &icon,
            &lf::MarkerOptions {
                title: format!("@{}", spec.handle),
                rise_on_hover: true,
            },
        )
    }

    fn click_closure(&self, note_id: String) -> Closure<dyn Fn(JsValue)> {
        let handlers = self.marker_handlers.clone();
        Closure::new(move |_ev: JsValue| {
            let current: Vec<MapHandler> = handlers.borrow().values().cloned().collect();
            for handler in current {
                handler(MapEvent::MarkerClick(note_id.clone()));
            }
        })
    }

    fn build_entry(&self, spec: &MarkerSpec) -> Result<MarkerEntry, JsValue> {
        let on_click = self.click_closure(spec.note_id.clone());
        let flat = Self::new_marker(spec)?;
        flat.on("click", on_click.as_ref().unchecked_ref());
        // A Leaflet layer lives in one group at a time, so the cluster layer
        // gets its own marker sharing the click closure.
        let twin = match &self.cluster {
            Some(_) => {
                let twin = Self::new_marker(spec)?;
                twin.on("click", on_click.as_ref().unchecked_ref());
                Some(twin)
            }
            None => None,
        };
        Ok(MarkerEntry { flat, twin, on_click })
    }
}

impl MapSurface for LeafletSurface {
    fn supports_clustering(&self) -> bool {
        self.cluster.is_some()
    }

    fn add_marker(&mut self, spec: &MarkerSpec) {
        if self.destroyed {
            return;
        }
        match self.build_entry(spec) {
            Ok(entry) => {
                self.flat.add_layer(&entry.flat);
                if let (Some(cluster), Some(twin)) = (&self.cluster, &entry.twin) {
                    cluster.add_layer(twin);
                }
                self.markers.push(entry);
            }
            Err(e) => log::warn!("[MAP] marker for note {} failed: {:?}", spec.note_id, e),
        }
    }

    fn clear_markers(&mut self) {
        for entry in self.markers.drain(..) {
            let callback: &js_sys::Function = entry.on_click.as_ref().unchecked_ref();
            entry.flat.off("click", callback);
            if let Some(twin) = &entry.twin {
                twin.off("click", callback);
            }
        }
        self.flat.clear_layers();
        if let Some(cluster) = &self.cluster {
            cluster.clear_layers();
        }
    }

    fn show_layer(&mut self, layer: LayerKind) {
        if self.destroyed {
            return;
        }
        if let Some(group) = self.group(layer) {
            if !self.map.has_layer(group) {
                self.map.add_layer(group);
            }
        }
    }

    fn hide_layer(&mut self, layer: LayerKind) {
        if self.destroyed {
            return;
        }
        if let Some(group) = self.group(layer) {
            if self.map.has_layer(group) {
                self.map.remove_layer(group);
            }
        }
    }

    fn listen(&mut self, kind: MapEventKind, handler: MapHandler) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);

        let event = match kind {
            MapEventKind::MarkerClick => {
                self.marker_handlers.borrow_mut().insert(id, handler);
                return id;
            }
            MapEventKind::Click => "click",
            MapEventKind::Move => "move",
            MapEventKind::Zoom => "zoom",
            MapEventKind::Resize => "resize",
        };

        let callback: Closure<dyn Fn(JsValue)> = if kind == MapEventKind::Click {
            Closure::new(move |ev: JsValue| {
                let ll = ev.unchecked_into::<lf::MouseEvent>().lat_lng();
                handler(MapEvent::Click(LatLng::new(ll.lat(), ll.lng())));
            })
        } else {
            Closure::new(move |_ev: JsValue| handler(MapEvent::ViewChanged))
        };
        self.map.on(event, callback.as_ref().unchecked_ref());
        self.map_listeners.insert(id, (event, callback));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        if self.marker_handlers.borrow_mut().remove(&id).is_some() {
            return;
        }
        if let Some((event, callback)) = self.map_listeners.remove(&id) {
            self.map.off(event, callback.as_ref().unchecked_ref());
        }
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.destroyed {
            return;
        }
        if let Err(e) = self.map.get_container().style().set_property("cursor", cursor.css()) {
            log::debug!("[MAP] cursor not set: {:?}", e);
        }
    }

    fn project(&self, position: LatLng) -> Option<ScreenPoint> {
        if self.destroyed {
            return None;
        }
        let point = self.map.lat_lng_to_container_point(position.lat, position.lng);
        Some(ScreenPoint { x: point.x(), y: point.y() })
    }

    fn viewport(&self) -> ScreenSize {
        if self.destroyed {
            return ScreenSize { width: 0.0, height: 0.0 };
        }
        let size = self.map.get_size();
        ScreenSize {
            width: size.x(),
            height: size.y(),
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        let ids: Vec<ListenerId> = self.map_listeners.keys().copied().collect();
        for id in ids {
            self.unlisten(id);
        }
        self.marker_handlers.borrow_mut().clear();
        self.clear_markers();
        self.map.remove();
        self.destroyed = true;
    }
}
