//! Navigation checks.
//!
//! The guard answers "may the learner open this?" for content addressed by
//! id, and explains a refusal with a [`UserMessage`]. Unlike the unlock
//! rules it also refuses content that is malformed or whose track is
//! still closed.

use crate::core::catalog::Catalog;
use crate::core::content::{Lesson, Level, Track};
use crate::core::messages::UserMessage;
use crate::core::unlock::Unlocker;

#[derive(Debug, Clone, Copy)]
pub struct NavigationGuard<'a> {
    catalog: &'a Catalog,
    unlocker: Unlocker<'a>,
}

impl<'a> NavigationGuard<'a> {
    pub fn new(catalog: &'a Catalog, unlocker: Unlocker<'a>) -> Self {
        Self { catalog, unlocker }
    }

    /// Resolve a lesson the learner may open, with its owning level.
    pub fn check_lesson(&self, lesson_id: &str) -> Result<(&'a Level, &'a Lesson), UserMessage> {
        let (level, lesson) = self
            .catalog
            .lesson(lesson_id)
            .ok_or(UserMessage::LessonNotFound)?;

        if !lesson.is_valid() || !level.has_lessons() {
            return Err(UserMessage::NavigationError);
        }
        if !self.unlocker.is_track_unlocked(level.track) {
            return Err(UserMessage::TrackLocked);
        }
        if !self.unlocker.is_level_unlocked(level) {
            return Err(UserMessage::LevelLocked);
        }
        if !self.unlocker.is_lesson_unlocked(lesson, level) {
            return Err(UserMessage::LessonLocked);
        }

        Ok((level, lesson))
    }

    /// Resolve a level the learner may open.
    pub fn check_level(&self, track: Track, level_number: u32) -> Result<&'a Level, UserMessage> {
        let level = self
            .catalog
            .level(track, level_number)
            .ok_or(UserMessage::LevelNotFound)?;

        if !level.is_valid() {
            return Err(UserMessage::NavigationError);
        }
        if !self.unlocker.is_track_unlocked(track) {
            return Err(UserMessage::TrackLocked);
        }
        if !self.unlocker.is_level_unlocked(level) {
            return Err(UserMessage::LevelLocked);
        }

        Ok(level)
    }

    pub fn check_track(&self, track: Track) -> Result<(), UserMessage> {
        if self.unlocker.is_track_unlocked(track) {
            Ok(())
        } else {
            Err(UserMessage::TrackLocked)
        }
    }

    pub fn can_navigate_to_lesson(&self, lesson_id: &str) -> bool {
        self.check_lesson(lesson_id).is_ok()
    }

    pub fn can_navigate_to_level(&self, track: Track, level_number: u32) -> bool {
        self.check_level(track, level_number).is_ok()
    }

    pub fn can_navigate_to_track(&self, track: Track) -> bool {
        self.check_track(track).is_ok()
    }
}
