//! Content entity types for Stepwise.
//!
//! Lessons, levels, tracks and badges are authored outside the engine and
//! are immutable once loaded. Progress refers to them only by id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StepwiseError;

/// Hint returned when a lesson has no hint at the requested index.
pub const NO_MORE_HINTS: &str = "No more hints available. You've got this!";

/// A learning path. Levels are partitioned by track and numbered from 0
/// within each track.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum Track {
    /// The Swift language track. Always open.
    #[default]
    #[serde(rename = "swift")]
    Swift,
    /// The SwiftUI framework track. Gated behind the Swift track.
    #[serde(rename = "swiftUI")]
    SwiftUi,
}

impl Track {
    /// All tracks in display order.
    pub const ALL: [Track; 2] = [Track::Swift, Track::SwiftUi];

    /// The track that is always unlocked.
    pub const PRIMARY: Track = Track::Swift;

    /// Stable string tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Swift => "swift",
            Track::SwiftUi => "swiftUI",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Track::Swift => "Swift Language",
            Track::SwiftUi => "SwiftUI Framework",
        }
    }

    /// Whether this is the always-open track.
    pub fn is_primary(&self) -> bool {
        *self == Self::PRIMARY
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = StepwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "swift" => Ok(Track::Swift),
            "swiftui" | "swift-ui" | "swift_ui" => Ok(Track::SwiftUi),
            _ => Err(StepwiseError::not_found("track", s)),
        }
    }
}

/// A single lesson: theory content plus an optional code challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    /// Stable unique identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Theory text shown before the challenge.
    pub content: String,
    /// Starter code for the challenge. `None` for theory-only lessons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    /// Expected solution the submission is compared against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    /// Ordered hints.
    #[serde(default)]
    pub hints: Vec<String>,
    /// Estimated minutes, at least 1.
    #[serde(
        default = "default_estimated_minutes",
        deserialize_with = "deserialize_minutes"
    )]
    pub estimated_minutes: u32,
}

fn default_estimated_minutes() -> u32 {
    5
}

fn deserialize_minutes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(1, u32::MAX as i64) as u32)
}

fn deserialize_level_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Ok(raw.clamp(0, u32::MAX as i64) as u32)
}

impl Lesson {
    /// Create a theory-only lesson.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            content: content.into(),
            code_challenge: None,
            solution: None,
            hints: Vec::new(),
            estimated_minutes: default_estimated_minutes(),
        }
    }

    /// Attach a code challenge and its expected solution.
    pub fn with_challenge(mut self, challenge: impl Into<String>, solution: impl Into<String>) -> Self {
        self.code_challenge = Some(challenge.into());
        self.solution = Some(solution.into());
        self
    }

    /// Set the ordered hints.
    pub fn with_hints<I, S>(mut self, hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hints = hints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the estimated minutes (clamped to at least 1).
    pub fn with_estimated_minutes(mut self, minutes: u32) -> Self {
        self.estimated_minutes = minutes.max(1);
        self
    }

    /// A lesson is valid when its title and content are not blank.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && !self.content.trim().is_empty()
    }

    /// Whether the lesson carries a code challenge.
    pub fn is_interactive(&self) -> bool {
        self.code_challenge.is_some()
    }

    /// Whether the lesson is satisfied without any code.
    pub fn is_theory_only(&self) -> bool {
        self.code_challenge.is_none()
    }

    pub fn has_hints(&self) -> bool {
        !self.hints.is_empty()
    }

    pub fn hint_count(&self) -> usize {
        self.hints.len()
    }

    /// Hint at `index`, or an encouraging fallback when out of range.
    pub fn safe_hint(&self, index: usize) -> &str {
        self.hints.get(index).map(String::as_str).unwrap_or(NO_MORE_HINTS)
    }
}

/// A numbered group of lessons within a track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Stable unique identifier.
    pub id: String,
    /// Position in the track's unlock chain, starting at 0.
    #[serde(deserialize_with = "deserialize_level_number")]
    pub level_number: u32,
    pub title: String,
    pub description: String,
    /// Ordered lessons. Order defines the unlock chain.
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    pub track: Track,
}

impl Level {
    /// Create a new level.
    pub fn new(
        id: impl Into<String>,
        level_number: u32,
        title: impl Into<String>,
        description: impl Into<String>,
        lessons: Vec<Lesson>,
        track: Track,
    ) -> Self {
        Self {
            id: id.into(),
            level_number,
            title: title.into(),
            description: description.into(),
            lessons,
            track,
        }
    }

    pub fn has_lessons(&self) -> bool {
        !self.lessons.is_empty()
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// A level is valid when it has a non-blank title and at least one lesson.
    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty() && self.has_lessons()
    }

    /// Lesson at `index`, if any.
    pub fn safe_lesson(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Position of the lesson with the given id in the unlock chain.
    pub fn lesson_index(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == lesson_id)
    }

    /// Sum of the lessons' estimated minutes, saturating at `u32::MAX`.
    pub fn total_estimated_minutes(&self) -> u32 {
        self.lessons
            .iter()
            .map(|l| l.estimated_minutes)
            .fold(0u32, u32::saturating_add)
    }
}

/// Machine-readable badge unlock rule.
///
/// Serialized as a tagged object with a `kind` discriminator next to the
/// payload, e.g. `{"kind": "complete_lessons", "count": 3}`. Unknown kinds
/// fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BadgeRule {
    /// The level with this number has been completed.
    CompleteLevel { level_number: u32 },
    /// At least `count` lessons have been completed.
    CompleteLessons { count: u32 },
    /// The track is the selected one.
    CompleteTrack { track: Track },
    /// At least one lesson has been completed.
    FirstLesson,
    /// Reserved. Never satisfied.
    StreakDays { days: u32 },
}

/// A collectible reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Stable unique identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Icon reference for the presentation layer.
    pub icon: String,
    /// Human-readable unlock condition.
    pub unlock_condition: String,
    /// Rule evaluated against progress. `None` means the badge never
    /// unlocks automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<BadgeRule>,
}

impl Badge {
    /// Create a badge without a machine rule.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        unlock_condition: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            icon: icon.into(),
            unlock_condition: unlock_condition.into(),
            rule: None,
        }
    }

    /// Attach a machine rule.
    pub fn with_rule(mut self, rule: BadgeRule) -> Self {
        self.rule = Some(rule);
        self
    }
}
