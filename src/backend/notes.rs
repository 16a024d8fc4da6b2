//! Note Table Paths

pub use crate::config::NOTES_TABLE as TABLE;

/// Every note, newest first
pub fn notes_path() -> String {
    format!("{}?select=*&order=created_at.desc", TABLE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_path_orders_newest_first() {
        assert_eq!(notes_path(), "user_comments?select=*&order=created_at.desc");
    }
}
