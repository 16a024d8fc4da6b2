//! Leaflet Bindings
//!
//! Thin wasm-bindgen bindings to the global `L` object loaded from the
//! Leaflet script tag, plus the optional markercluster plugin.
//! Option structs serialize to plain JS objects via serde-wasm-bindgen.

use js_sys::{Function, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    /// Anything that can be added to a map or a layer group
    #[derive(Debug, Clone)]
    pub type Layer;

    #[wasm_bindgen(method)]
    pub fn on(this: &Layer, event: &str, handler: &Function) -> Layer;

    #[wasm_bindgen(method)]
    pub fn off(this: &Layer, event: &str, handler: &Function) -> Layer;

    #[wasm_bindgen(extends = Layer)]
    #[derive(Debug, Clone)]
    pub type LayerGroup;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &LayerGroup, layer: &Layer) -> LayerGroup;

    #[wasm_bindgen(method, js_name = clearLayers)]
    pub fn clear_layers(this: &LayerGroup) -> LayerGroup;

    #[wasm_bindgen(method, js_name = getLayers)]
    pub fn get_layers(this: &LayerGroup) -> js_sys::Array;

    #[wasm_bindgen(js_namespace = L, js_name = layerGroup)]
    pub fn layer_group() -> LayerGroup;

    #[wasm_bindgen(extends = Layer)]
    #[derive(Debug, Clone)]
    pub type Marker;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn marker_raw(lat_lng: &JsValue, options: &JsValue) -> Marker;

    #[derive(Debug, Clone)]
    pub type DivIcon;

    #[wasm_bindgen(js_namespace = L, js_name = divIcon)]
    fn div_icon_raw(options: &JsValue) -> DivIcon;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer_raw(url_template: &str, options: &JsValue) -> Layer;

    #[derive(Debug, Clone)]
    pub type Control;

    #[wasm_bindgen(js_namespace = ["L", "control"], js_name = zoom)]
    fn zoom_control_raw(options: &JsValue) -> Control;

    #[wasm_bindgen(method, js_name = addTo)]
    pub fn add_to(this: &Control, map: &Map) -> Control;

    /// The map instance returned by `L.map`
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn map_raw(container: &web_sys::HtmlElement, options: &JsValue) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = addLayer)]
    pub fn add_layer(this: &Map, layer: &Layer) -> Map;

    #[wasm_bindgen(method, js_name = removeLayer)]
    pub fn remove_layer(this: &Map, layer: &Layer) -> Map;

    #[wasm_bindgen(method, js_name = hasLayer)]
    pub fn has_layer(this: &Map, layer: &Layer) -> bool;

    #[wasm_bindgen(method)]
    pub fn on(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn off(this: &Map, event: &str, handler: &Function) -> Map;

    #[wasm_bindgen(method)]
    pub fn remove(this: &Map) -> Map;

    #[wasm_bindgen(method, js_name = latLngToContainerPoint)]
    fn lat_lng_to_container_point_raw(this: &Map, lat_lng: &JsValue) -> Point;

    #[wasm_bindgen(method, js_name = getSize)]
    pub fn get_size(this: &Map) -> Point;

    #[wasm_bindgen(method, js_name = getContainer)]
    pub fn get_container(this: &Map) -> web_sys::HtmlElement;

    #[derive(Debug, Clone)]
    pub type Point;

    #[wasm_bindgen(method, getter)]
    pub fn x(this: &Point) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn y(this: &Point) -> f64;

    #[derive(Debug, Clone)]
    pub type LatLng;

    #[wasm_bindgen(method, getter)]
    pub fn lat(this: &LatLng) -> f64;

    #[wasm_bindgen(method, getter)]
    pub fn lng(this: &LatLng) -> f64;

    /// Payload of map mouse events (`click` and friends)
    #[derive(Debug, Clone)]
    pub type MouseEvent;

    #[wasm_bindgen(method, getter, js_name = latlng)]
    pub fn lat_lng(this: &MouseEvent) -> LatLng;

    /// Argument of the cluster plugin's `iconCreateFunction`
    #[derive(Debug, Clone)]
    pub type MarkerCluster;

    #[wasm_bindgen(method, js_name = getChildCount)]
    pub fn get_child_count(this: &MarkerCluster) -> u32;
}

// ========================
// Option Structs
// ========================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapOptions {
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_bounds: [[f64; 2]; 2],
    pub max_bounds_viscosity: f64,
    pub zoom_control: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayerOptions {
    pub attribution: String,
    pub subdomains: String,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ZoomControlOptions {
    pub position: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivIconOptions {
    pub html: String,
    pub class_name: String,
    pub icon_size: [u32; 2],
    pub icon_anchor: [u32; 2],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerOptions {
    pub title: String,
    pub rise_on_hover: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterOptions {
    pub max_cluster_radius: u32,
    pub show_coverage_on_hover: bool,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

// ========================
// Constructors
// ========================

fn leaflet_global() -> Option<JsValue> {
    let l = Reflect::get(&js_sys::global(), &JsValue::from_str("L")).ok()?;
    if l.is_undefined() || l.is_null() {
        None
    } else {
        Some(l)
    }
}

fn leaflet_fn(name: &str) -> Option<(JsValue, Function)> {
    let l = leaflet_global()?;
    let f = Reflect::get(&l, &JsValue::from_str(name)).ok()?;
    f.dyn_into::<Function>().ok().map(|f| (l, f))
}

/// Whether the Leaflet script has been loaded
pub fn is_available() -> bool {
    leaflet_fn("map").is_some()
}

/// Whether the markercluster plugin has been loaded
pub fn supports_clustering() -> bool {
    leaflet_fn("markerClusterGroup").is_some()
}

/// `[lat, lng]` array accepted wherever Leaflet takes a LatLng
pub fn lat_lng(lat: f64, lng: f64) -> JsValue {
    js_sys::Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng)).into()
}

pub fn map(container: &web_sys::HtmlElement, options: &MapOptions) -> Result<Map, JsValue> {
    map_raw(container, &to_js(options)?)
}

pub fn tile_layer(url_template: &str, options: &TileLayerOptions) -> Result<Layer, JsValue> {
    Ok(tile_layer_raw(url_template, &to_js(options)?))
}

pub fn zoom_control(options: &ZoomControlOptions) -> Result<Control, JsValue> {
    Ok(zoom_control_raw(&to_js(options)?))
}

pub fn div_icon(options: &DivIconOptions) -> Result<DivIcon, JsValue> {
    Ok(div_icon_raw(&to_js(options)?))
}

/// Marker with a custom icon; the icon is a live JS object so it is set
/// on the options after serialization.
pub fn marker(lat: f64, lng: f64, icon: &DivIcon, options: &MarkerOptions) -> Result<Marker, JsValue> {
    let js_options = to_js(options)?;
    Reflect::set(&js_options, &JsValue::from_str("icon"), icon)?;
    Ok(marker_raw(&lat_lng(lat, lng), &js_options))
}

/// Create a cluster group if the plugin is present.
///
/// Returns `Ok(None)` when `L.markerClusterGroup` is missing.
pub fn marker_cluster_group(options: &ClusterOptions, icon_create: &Function) -> Result<Option<LayerGroup>, JsValue> {
    let Some((l, factory)) = leaflet_fn("markerClusterGroup") else {
        return Ok(None);
    };
    let js_options = to_js(options)?;
    Reflect::set(&js_options, &JsValue::from_str("iconCreateFunction"), icon_create)?;
    let group = factory.call1(&l, &js_options)?;
    Ok(Some(group.unchecked_into()))
}

impl Map {
    pub fn lat_lng_to_container_point(&self, lat: f64, lng: f64) -> Point {
        self.lat_lng_to_container_point_raw(&lat_lng(lat, lng))
    }
}
