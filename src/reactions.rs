//! Reaction Tally
//!
//! Per-glyph totals across all submitters. There is no notion of "has the
//! current viewer reacted": a glyph present from anyone toggles to removal.

use crate::models::Reaction;

/// Glyphs offered by the picker
pub const EMOJI_PALETTE: &[&str] = &["👍", "❤️", "😍", "🎉", "🔥", "👏", "💯", "🚀"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionIntent {
    Add,
    Remove,
}

/// `Remove` when any reaction with this glyph exists, otherwise `Add`
pub fn reaction_intent(reactions: &[Reaction], emoji: &str) -> ReactionIntent {
    if reactions.iter().any(|r| r.emoji == emoji) {
        ReactionIntent::Remove
    } else {
        ReactionIntent::Add
    }
}

/// Glyph counts in first-seen order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReactionTally {
    entries: Vec<(String, usize)>,
}

impl ReactionTally {
    pub fn from_reactions(reactions: &[Reaction]) -> Self {
        let mut tally = Self::default();
        for reaction in reactions {
            tally.increment(&reaction.emoji);
        }
        tally
    }

    fn increment(&mut self, emoji: &str) {
        match self.entries.iter_mut().find(|(e, _)| e == emoji) {
            Some((_, count)) => *count += 1,
            None => self.entries.push((emoji.to_string(), 1)),
        }
    }

    /// Optimistic update ahead of the store round-trip.
    ///
    /// Removal drops the glyph entirely, matching the delete-by-glyph write.
    pub fn apply(&mut self, emoji: &str, intent: ReactionIntent) {
        match intent {
            ReactionIntent::Add => self.increment(emoji),
            ReactionIntent::Remove => self.entries.retain(|(e, _)| e != emoji),
        }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }
}
