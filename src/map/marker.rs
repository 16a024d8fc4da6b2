//! Marker Specs
//!
//! What a marker shows, independent of the drawing surface.

use crate::config::AvatarSettings;
use crate::models::{LatLng, NoteWithReactions};

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub note_id: String,
    pub position: LatLng,
    pub handle: String,
    pub avatar_url: String,
    pub fallback_url: String,
}

impl MarkerSpec {
    /// `None` unless the note has both coordinates
    pub fn from_note(note: &NoteWithReactions, avatars: &AvatarSettings) -> Option<Self> {
        let position = note.note.position()?;
        Some(Self {
            note_id: note.note.id.clone(),
            position,
            handle: note.note.handle.clone(),
            avatar_url: avatars.avatar_url(&note.note.handle),
            fallback_url: avatars.fallback.to_string(),
        })
    }

    /// Circular avatar with an inline swap to the fallback image on load error
    pub fn icon_html(&self) -> String {
        format!(
            r#"<img class="avatar-marker-img" src="{}" alt="{}" onerror="this.onerror=null;this.src='{}';" />"#,
            escape_html(&self.avatar_url),
            escape_html(&self.handle),
            escape_html(&self.fallback_url)
        )
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `marker-cluster-small|medium|large` bucket for a cluster of `count`
pub fn cluster_size_class(count: u32) -> &'static str {
    match count {
        0..=9 => "marker-cluster marker-cluster-small",
        10..=99 => "marker-cluster marker-cluster-medium",
        _ => "marker-cluster marker-cluster-large",
    }
}

pub fn cluster_icon_html(count: u32) -> String {
    format!("<div><span>{}</span></div>", count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::join_reactions;
    use crate::sync::tests::note;

    #[test]
    fn test_marker_requires_both_coordinates() {
        let avatars = AvatarSettings::default();
        let notes = join_reactions(
            vec![
                note("a", Some(1.0), Some(2.0)),
                note("b", None, Some(2.0)),
                note("c", Some(1.0), None),
                note("d", Some(0.0), Some(0.0)),
            ],
            vec![],
        );
        let specs: Vec<MarkerSpec> = notes.iter().filter_map(|n| MarkerSpec::from_note(n, &avatars)).collect();
        let ids: Vec<&str> = specs.iter().map(|s| s.note_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(specs[0].avatar_url, "https://unavatar.io/x/usera");
    }

    #[test]
    fn test_icon_html_escapes_handle() {
        let spec = MarkerSpec {
            note_id: "1".to_string(),
            position: LatLng::new(0.0, 0.0),
            handle: "<b>\"x\"</b>".to_string(),
            avatar_url: "https://unavatar.io/x/x".to_string(),
            fallback_url: "/assets/avatar-fallback.svg".to_string(),
        };
        let html = spec.icon_html();
        assert!(html.contains("alt=\"&lt;b&gt;&quot;x&quot;&lt;/b&gt;\""));
        assert!(html.contains("this.src='/assets/avatar-fallback.svg'"));
    }

    #[test]
    fn test_cluster_size_buckets() {
        assert_eq!(cluster_size_class(9), "marker-cluster marker-cluster-small");
        assert_eq!(cluster_size_class(10), "marker-cluster marker-cluster-medium");
        assert_eq!(cluster_size_class(100), "marker-cluster marker-cluster-large");
        assert_eq!(cluster_icon_html(12), "<div><span>12</span></div>");
    }
}
