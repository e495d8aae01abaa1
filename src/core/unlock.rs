//! Unlock rules for lessons, levels and tracks.
//!
//! Everything here is a pure function of the catalog and a progress
//! snapshot. Lookups that miss resolve to "locked" rather than erroring.

use serde::{Deserialize, Serialize};

use crate::core::catalog::Catalog;
use crate::core::content::{Lesson, Level, Track};
use crate::core::progress::UserProgress;

/// Default primary-track level whose completion opens the secondary track.
pub const DEFAULT_GATING_LEVEL: u32 = 2;

/// A lesson as the learner sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonState {
    Locked,
    Available,
    Completed,
}

/// A level as the learner sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelState {
    Locked,
    Unlocked,
    Completed,
}

impl LessonState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonState::Locked => "locked",
            LessonState::Available => "available",
            LessonState::Completed => "completed",
        }
    }
}

impl LevelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelState::Locked => "locked",
            LevelState::Unlocked => "unlocked",
            LevelState::Completed => "completed",
        }
    }

    /// Whether the learner may enter the level.
    pub fn is_accessible(&self) -> bool {
        !matches!(self, LevelState::Locked)
    }
}

/// Evaluates unlock rules against one progress snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Unlocker<'a> {
    catalog: &'a Catalog,
    progress: &'a UserProgress,
    gating_level: u32,
}

impl<'a> Unlocker<'a> {
    /// Create an evaluator using the default gating level.
    pub fn new(catalog: &'a Catalog, progress: &'a UserProgress) -> Self {
        Self::with_gating_level(catalog, progress, DEFAULT_GATING_LEVEL)
    }

    /// Create an evaluator with a custom gating level for the secondary track.
    pub fn with_gating_level(
        catalog: &'a Catalog,
        progress: &'a UserProgress,
        gating_level: u32,
    ) -> Self {
        Self {
            catalog,
            progress,
            gating_level,
        }
    }

    /// Level 0 is always open. Level n opens once level n-1 of the same
    /// track exists and its number is recorded as completed.
    pub fn is_level_unlocked(&self, level: &Level) -> bool {
        let Some(previous) = level.level_number.checked_sub(1) else {
            return true;
        };

        if self.catalog.level(level.track, previous).is_none() {
            return false;
        }

        self.progress.is_level_number_completed(previous)
    }

    /// Every lesson of the level is completed. Empty levels never are.
    pub fn is_level_completed(&self, level: &Level) -> bool {
        level.has_lessons()
            && level
                .lessons
                .iter()
                .all(|lesson| self.progress.is_lesson_completed(&lesson.id))
    }

    /// The first lesson of an open level is available; later lessons open
    /// when their predecessor is completed.
    pub fn is_lesson_unlocked(&self, lesson: &Lesson, level: &Level) -> bool {
        if !self.is_level_unlocked(level) {
            return false;
        }

        match level.lesson_index(&lesson.id) {
            Some(0) => true,
            Some(index) => level
                .safe_lesson(index - 1)
                .is_some_and(|previous| self.progress.is_lesson_completed(&previous.id)),
            None => false,
        }
    }

    /// The primary track is always open. Any other track opens once the
    /// gating level of the primary track exists, has lessons, and is
    /// completed.
    pub fn is_track_unlocked(&self, track: Track) -> bool {
        if track.is_primary() {
            return true;
        }

        match self.catalog.level(Track::PRIMARY, self.gating_level) {
            Some(gate) if gate.has_lessons() => self.is_level_completed(gate),
            _ => false,
        }
    }

    pub fn level_state(&self, level: &Level) -> LevelState {
        if self.is_level_completed(level) {
            LevelState::Completed
        } else if self.is_level_unlocked(level) {
            LevelState::Unlocked
        } else {
            LevelState::Locked
        }
    }

    pub fn lesson_state(&self, lesson: &Lesson, level: &Level) -> LessonState {
        if self.progress.is_lesson_completed(&lesson.id) {
            LessonState::Completed
        } else if self.is_lesson_unlocked(lesson, level) {
            LessonState::Available
        } else {
            LessonState::Locked
        }
    }

    /// Number of the level's lessons already completed.
    pub fn completed_lessons_in_level(&self, level: &Level) -> usize {
        level
            .lessons
            .iter()
            .filter(|lesson| self.progress.is_lesson_completed(&lesson.id))
            .count()
    }
}
