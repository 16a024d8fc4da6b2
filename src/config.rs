//! Configuration
//!
//! Backend credentials come from the build environment (Trunk forwards
//! `PINBOARD_SUPABASE_URL` and `PINBOARD_SUPABASE_ANON_KEY`); everything else is
//! fixed map and avatar settings.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::ConfigError;

pub const URL_VAR: &str = "PINBOARD_SUPABASE_URL";
pub const KEY_VAR: &str = "PINBOARD_SUPABASE_ANON_KEY";

/// Table holding the notes
pub const NOTES_TABLE: &str = "user_comments";
/// Table holding the reactions
pub const REACTIONS_TABLE: &str = "comment_reactions";

/// Connection settings for the hosted backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

impl BackendConfig {
    /// Validate and normalize (trailing slashes removed)
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let url = url.trim().trim_end_matches('/');
        let anon_key = anon_key.trim();
        if url.is_empty() {
            return Err(ConfigError::Missing(URL_VAR));
        }
        if anon_key.is_empty() {
            return Err(ConfigError::Missing(KEY_VAR));
        }
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(url.to_string()));
        }
        Ok(Self {
            url: url.to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    /// Read the credentials baked in at build time
    pub fn from_build_env() -> Result<Self, ConfigError> {
        let url = option_env!("PINBOARD_SUPABASE_URL").ok_or(ConfigError::Missing(URL_VAR))?;
        let key = option_env!("PINBOARD_SUPABASE_ANON_KEY").ok_or(ConfigError::Missing(KEY_VAR))?;
        Self::new(url, key)
    }

    /// Base of the PostgREST endpoints
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url)
    }

    /// Phoenix websocket endpoint of the realtime service
    pub fn realtime_url(&self) -> String {
        let ws_base = if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.url.clone()
        };
        format!(
            "{}/realtime/v1/websocket?apikey={}&vsn=1.0.0",
            ws_base,
            utf8_percent_encode(&self.anon_key, NON_ALPHANUMERIC)
        )
    }
}

/// Map surface settings
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub center: [f64; 2],
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_bounds: [[f64; 2]; 2],
    pub max_bounds_viscosity: f64,
    pub zoom_control_position: &'static str,
    pub tile_url: &'static str,
    pub tile_attribution: &'static str,
    pub tile_subdomains: &'static str,
    pub max_zoom: u8,
    pub max_cluster_radius: u32,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: [20.0, 0.0],
            zoom: 2.5,
            min_zoom: 2.5,
            max_bounds: [[-90.0, -180.0], [90.0, 180.0]],
            max_bounds_viscosity: 1.0,
            zoom_control_position: "bottomright",
            tile_url: "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            tile_attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>",
            tile_subdomains: "abcd",
            max_zoom: 20,
            max_cluster_radius: 50,
        }
    }
}

/// Avatar image and profile link sources
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvatarSettings {
    pub avatar_base: &'static str,
    pub fallback: &'static str,
    pub profile_base: &'static str,
}

impl Default for AvatarSettings {
    fn default() -> Self {
        Self {
            avatar_base: "https://unavatar.io/x/",
            fallback: "/assets/avatar-fallback.svg",
            profile_base: "https://x.com/",
        }
    }
}

impl AvatarSettings {
    pub fn avatar_url(&self, handle: &str) -> String {
        format!("{}{}", self.avatar_base, utf8_percent_encode(handle, NON_ALPHANUMERIC))
    }

    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}{}", self.profile_base, utf8_percent_encode(handle, NON_ALPHANUMERIC))
    }
}
