//! Page Mode
//!
//! `Idle -> Placing -> Composing(pos) -> Idle`. The pin button toggles
//! placing; a map click while placing opens the entry modal at that spot.

use crate::models::LatLng;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageMode {
    #[default]
    Idle,
    Placing,
    Composing(LatLng),
}

impl PageMode {
    /// Pin button pressed
    pub fn toggle_placing(self) -> Self {
        match self {
            PageMode::Idle => PageMode::Placing,
            PageMode::Placing => PageMode::Idle,
            composing @ PageMode::Composing(_) => composing,
        }
    }

    /// Map clicked at `position`; ignored unless placing
    pub fn map_clicked(self, position: LatLng) -> Self {
        match self {
            PageMode::Placing => PageMode::Composing(position),
            other => other,
        }
    }

    /// Note created
    pub fn submitted(self) -> Self {
        PageMode::Idle
    }

    /// Modal dismissed
    pub fn cancelled(self) -> Self {
        PageMode::Idle
    }

    /// Crosshair cursor and click-to-place are active.
    ///
    /// Stays on while composing so a failed submission keeps the user in
    /// placing mode.
    pub fn is_placing(&self) -> bool {
        matches!(self, PageMode::Placing | PageMode::Composing(_))
    }

    /// Pending coordinates of the open modal
    pub fn pending_position(&self) -> Option<LatLng> {
        match self {
            PageMode::Composing(position) => Some(*position),
            _ => None,
        }
    }

    pub fn pin_button_label(&self) -> &'static str {
        if self.is_placing() {
            "Click on the map to select a location"
        } else {
            "Pin on Map"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPOT: LatLng = LatLng { lat: 48.85, lng: 2.35 };

    #[test]
    fn test_full_cycle() {
        let mode = PageMode::default();
        assert_eq!(mode, PageMode::Idle);

        let mode = mode.toggle_placing();
        assert!(mode.is_placing());

        let mode = mode.map_clicked(SPOT);
        assert_eq!(mode.pending_position(), Some(SPOT));

        let mode = mode.submitted();
        assert_eq!(mode, PageMode::Idle);
        assert_eq!(mode.pin_button_label(), "Pin on Map");
    }

    #[test]
    fn test_clicks_outside_placing_are_ignored() {
        assert_eq!(PageMode::Idle.map_clicked(SPOT), PageMode::Idle);
        let composing = PageMode::Composing(SPOT);
        assert_eq!(composing.map_clicked(LatLng::new(0.0, 0.0)), composing);
    }

    #[test]
    fn test_toggle_twice_returns_to_idle() {
        assert_eq!(PageMode::Idle.toggle_placing().toggle_placing(), PageMode::Idle);
    }

    #[test]
    fn test_cancel_from_composing() {
        let mode = PageMode::Placing.map_clicked(SPOT).cancelled();
        assert_eq!(mode, PageMode::Idle);
        assert_eq!(mode.pending_position(), None);
    }

    #[test]
    fn test_composing_keeps_placing_label() {
        let mode = PageMode::Composing(SPOT);
        assert!(mode.is_placing());
        assert_eq!(mode.pin_button_label(), "Click on the map to select a location");
        assert_eq!(mode.toggle_placing(), mode);
    }
}
