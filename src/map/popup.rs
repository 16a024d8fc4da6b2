//! Popup Placement
//!
//! Chooses where the note popup sits relative to its marker so it stays inside
//! the map container.

/// Gap kept between the popup and the container edge
const EDGE_MARGIN: f64 = 8.0;

/// Popup box used for placement decisions
pub const POPUP_SIZE: ScreenSize = ScreenSize { width: 300.0, height: 240.0 };

/// Half the avatar marker size; the popup clears the marker by this much
pub const MARKER_RADIUS: f64 = 20.0;

/// Container-relative pixel position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Above,
    Below,
    Right,
    Left,
}

impl Placement {
    pub fn class(&self) -> &'static str {
        match self {
            Placement::Above => "popup-above",
            Placement::Below => "popup-below",
            Placement::Right => "popup-right",
            Placement::Left => "popup-left",
        }
    }
}

/// Where to draw the popup: top-left corner plus the side it opens to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PopupLayout {
    pub placement: Placement,
    pub left: f64,
    pub top: f64,
}

fn clamp_axis(value: f64, size: f64, extent: f64) -> f64 {
    let max = (extent - size - EDGE_MARGIN).max(EDGE_MARGIN);
    value.max(EDGE_MARGIN).min(max)
}

/// Prefer above, then below, right, left; when nothing fits, open towards the
/// larger vertical half. The result is clamped into the viewport.
pub fn place_popup(anchor: ScreenPoint, popup: ScreenSize, viewport: ScreenSize, offset: f64) -> PopupLayout {
    let fits_above = anchor.y - offset - popup.height >= EDGE_MARGIN;
    let fits_below = anchor.y + offset + popup.height <= viewport.height - EDGE_MARGIN;
    let fits_right = anchor.x + offset + popup.width <= viewport.width - EDGE_MARGIN;
    let fits_left = anchor.x - offset - popup.width >= EDGE_MARGIN;

    let placement = if fits_above {
        Placement::Above
    } else if fits_below {
        Placement::Below
    } else if fits_right {
        Placement::Right
    } else if fits_left {
        Placement::Left
    } else if anchor.y < viewport.height / 2.0 {
        Placement::Below
    } else {
        Placement::Above
    };

    let (left, top) = match placement {
        Placement::Above => (anchor.x - popup.width / 2.0, anchor.y - offset - popup.height),
        Placement::Below => (anchor.x - popup.width / 2.0, anchor.y + offset),
        Placement::Right => (anchor.x + offset, anchor.y - popup.height / 2.0),
        Placement::Left => (anchor.x - offset - popup.width, anchor.y - popup.height / 2.0),
    };

    PopupLayout {
        placement,
        left: clamp_axis(left, popup.width, viewport.width),
        top: clamp_axis(top, popup.height, viewport.height),
    }
}
