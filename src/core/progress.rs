//! The user's progress record.
//!
//! `UserProgress` is the only mutable entity in the engine. All of its
//! mutations are set inserts or plain assignments, so every operation is
//! idempotent: applying it twice leaves the same state as applying it once.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::core::content::Track;

/// What a single learner has completed and earned.
///
/// Serialized as one JSON object; the id sets become sorted arrays and the
/// track becomes its string tag.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProgress {
    completed_lesson_ids: BTreeSet<String>,
    completed_level_numbers: BTreeSet<u32>,
    earned_badge_ids: BTreeSet<String>,
    #[serde(deserialize_with = "deserialize_non_negative")]
    current_level_number: u32,
    selected_track: Track,
    has_completed_onboarding: bool,
}

fn deserialize_non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}

impl UserProgress {
    /// Fresh progress for a new installation.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed_lesson_ids(&self) -> &BTreeSet<String> {
        &self.completed_lesson_ids
    }

    pub fn completed_level_numbers(&self) -> &BTreeSet<u32> {
        &self.completed_level_numbers
    }

    pub fn earned_badge_ids(&self) -> &BTreeSet<String> {
        &self.earned_badge_ids
    }

    pub fn current_level_number(&self) -> u32 {
        self.current_level_number
    }

    pub fn selected_track(&self) -> Track {
        self.selected_track
    }

    pub fn has_completed_onboarding(&self) -> bool {
        self.has_completed_onboarding
    }

    pub fn is_lesson_completed(&self, lesson_id: &str) -> bool {
        self.completed_lesson_ids.contains(lesson_id)
    }

    pub fn is_level_number_completed(&self, level_number: u32) -> bool {
        self.completed_level_numbers.contains(&level_number)
    }

    pub fn has_badge(&self, badge_id: &str) -> bool {
        self.earned_badge_ids.contains(badge_id)
    }

    pub fn completed_lessons_count(&self) -> usize {
        self.completed_lesson_ids.len()
    }

    pub fn completed_levels_count(&self) -> usize {
        self.completed_level_numbers.len()
    }

    pub fn earned_badges_count(&self) -> usize {
        self.earned_badge_ids.len()
    }

    // =========================================================================
    // Idempotent mutations
    // =========================================================================

    /// Mark a lesson complete. Returns whether the set changed.
    pub fn complete_lesson(&mut self, lesson_id: impl Into<String>) -> bool {
        self.completed_lesson_ids.insert(lesson_id.into())
    }

    /// Mark a level complete. Returns whether the set changed.
    pub fn complete_level(&mut self, level_number: u32) -> bool {
        self.completed_level_numbers.insert(level_number)
    }

    /// Record an earned badge. Returns whether the set changed.
    pub fn earn_badge(&mut self, badge_id: impl Into<String>) -> bool {
        self.earned_badge_ids.insert(badge_id.into())
    }

    /// Select a track. Returns whether the selection changed.
    pub fn select_track(&mut self, track: Track) -> bool {
        let changed = self.selected_track != track;
        self.selected_track = track;
        changed
    }

    /// Mark onboarding done. Returns whether the flag changed.
    pub fn complete_onboarding(&mut self) -> bool {
        let changed = !self.has_completed_onboarding;
        self.has_completed_onboarding = true;
        changed
    }

    /// Move the current level forward. Never moves it backwards.
    pub fn advance_current_level(&mut self, level_number: u32) -> bool {
        if level_number > self.current_level_number {
            self.current_level_number = level_number;
            true
        } else {
            false
        }
    }

    /// Clear completions, badges and onboarding. The selected track is kept.
    pub fn reset(&mut self) {
        self.completed_lesson_ids.clear();
        self.completed_level_numbers.clear();
        self.earned_badge_ids.clear();
        self.current_level_number = 0;
        self.has_completed_onboarding = false;
    }
}
