//! Stepwise - lesson progression for guided learning
//!
//! Stepwise tracks a learner through tracks, levels and lessons. It decides
//! what is unlocked, checks code submissions, awards badges and keeps the
//! learner's progress in a local record between runs.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod util;

pub use config::Config;
pub use core::{
    Badge, BadgeEvaluator, BadgeRule, Catalog, DefaultBadgeEvaluator, DefaultLessonValidator,
    Lesson, LessonState, LessonValidator, Level, LevelState, NavigationGuard, ProgressChange,
    ProgressController, ProgressEvent, SubmissionOutcome, Track, Unlocker, UserMessage,
    UserProgress, ValidationOutcome,
};
pub use error::{Result, StepwiseError};
pub use storage::{FileProgressStore, MemoryProgressStore, ProgressStore};

// CLI commands
pub use cli::{
    BadgesCommand, HintCommand, OnboardCommand, ResetCommand, StatusCommand, SubmitCommand,
    TrackCommand,
};
