//! User-facing texts.
//!
//! Every message keeps a calm, encouraging tone for beginners.

use std::fmt;

use serde::Serialize;

/// A situation the learner should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMessage {
    // Empty states
    NoLessonsAvailable,
    NoLevelsAvailable,
    NoProgressYet,
    NoBadgesYet,

    // Locked content
    LessonLocked,
    LevelLocked,
    TrackLocked,

    // Validation
    CodeNotReady,
    CodeIncorrect,
    CodeCorrect,
    EmptyCodeEditor,
    NoCodeChange,

    // Recovery
    LessonNotFound,
    LevelNotFound,
    NavigationError,

    Loading,
}

impl UserMessage {
    pub fn message(&self) -> &'static str {
        match self {
            UserMessage::NoLessonsAvailable => "No lessons are available yet. Check back soon!",
            UserMessage::NoLevelsAvailable => {
                "No levels to show right now. This is where your learning journey begins!"
            }
            UserMessage::NoProgressYet => {
                "Ready to start learning? Your journey begins with the first lesson."
            }
            UserMessage::NoBadgesYet => "Complete lessons to earn your first badge!",
            UserMessage::LessonLocked => "Complete the previous lesson to unlock this one.",
            UserMessage::LevelLocked => "Complete the previous level to unlock this one.",
            UserMessage::TrackLocked => "Complete Swift Level 2 to unlock the SwiftUI track.",
            UserMessage::CodeNotReady => {
                "Give it a try! Write some code and tap Run when you're ready."
            }
            UserMessage::CodeIncorrect => {
                "Not quite right yet. Take another look at the lesson and try again. You're doing great!"
            }
            UserMessage::CodeCorrect => {
                "✓ Perfect! Your code is correct.\n\nGreat job! You've completed this lesson."
            }
            UserMessage::EmptyCodeEditor => {
                "Looks like the code editor is empty. Try adding some Swift code!"
            }
            UserMessage::NoCodeChange => "The code looks the same. Try making a change first!",
            UserMessage::LessonNotFound => {
                "We couldn't find that lesson. Let's head back and try again."
            }
            UserMessage::LevelNotFound => {
                "We couldn't find that level. Let's return to the home screen."
            }
            UserMessage::NavigationError => {
                "Something unexpected happened. Let's start fresh from the home screen."
            }
            UserMessage::Loading => "Loading...",
        }
    }

    /// Icon reference for the presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            UserMessage::NoLessonsAvailable | UserMessage::NoLevelsAvailable => "book.closed",
            UserMessage::NoProgressYet => "checkmark.circle",
            UserMessage::NoBadgesYet => "star",
            UserMessage::LessonLocked | UserMessage::LevelLocked | UserMessage::TrackLocked => {
                "lock.fill"
            }
            UserMessage::CodeCorrect => "checkmark.circle.fill",
            UserMessage::CodeIncorrect
            | UserMessage::CodeNotReady
            | UserMessage::EmptyCodeEditor
            | UserMessage::NoCodeChange => "lightbulb",
            UserMessage::LessonNotFound
            | UserMessage::LevelNotFound
            | UserMessage::NavigationError => "arrow.uturn.backward",
            UserMessage::Loading => "hourglass",
        }
    }

    pub fn is_locked_content(&self) -> bool {
        matches!(
            self,
            UserMessage::LessonLocked | UserMessage::LevelLocked | UserMessage::TrackLocked
        )
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
