//! Core types and logic for Stepwise.
//!
//! This module contains the content model, the progress record, the unlock
//! and badge rules, lesson validation, and the controller that ties them
//! together.

pub mod badges;
pub mod catalog;
pub mod content;
pub mod controller;
pub mod guard;
pub mod messages;
pub mod progress;
pub mod unlock;
pub mod validate;

pub use badges::{BadgeEvaluator, DefaultBadgeEvaluator};
pub use catalog::Catalog;
pub use content::{Badge, BadgeRule, Lesson, Level, Track, NO_MORE_HINTS};
pub use controller::{
    PendingSubmission, ProgressChange, ProgressController, ProgressEvent, SubmissionOutcome,
    SubscriptionId, SUCCESS_MESSAGE,
};
pub use guard::NavigationGuard;
pub use messages::UserMessage;
pub use progress::UserProgress;
pub use unlock::{LessonState, LevelState, Unlocker, DEFAULT_GATING_LEVEL};
pub use validate::{
    DefaultLessonValidator, LessonValidator, ValidationOutcome, VALIDATION_FAILURE_MESSAGE,
};
