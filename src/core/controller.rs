//! The progress controller: the single entry point for progress mutations.
//!
//! A submission flows through validation, lesson completion, the owning
//! level's completion check, badge re-evaluation, and finally a persistence
//! request. Subscribers are notified after every successful mutation.
//!
//! Persistence is fail-open. The first failed save is logged and the
//! controller stops writing for the rest of the session, keeping progress in
//! memory only.

use std::fmt;
use std::rc::{Rc, Weak};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Config;
use crate::core::badges::{self, BadgeEvaluator, DefaultBadgeEvaluator};
use crate::core::catalog::Catalog;
use crate::core::content::{Badge, Lesson, Level, Track};
use crate::core::guard::NavigationGuard;
use crate::core::progress::UserProgress;
use crate::core::unlock::{LessonState, LevelState, Unlocker, DEFAULT_GATING_LEVEL};
use crate::core::validate::{DefaultLessonValidator, LessonValidator};
use crate::error::{FailOpen, Result, StepwiseError};
use crate::storage::ProgressStore;

/// Message shown after a successful submission.
pub const SUCCESS_MESSAGE: &str = "Nice work! You completed this lesson.";

/// Default simulated execution delay.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1500);

/// What changed in a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressChange {
    LessonCompleted {
        lesson_id: String,
        completed_level: Option<u32>,
        new_badge_ids: Vec<String>,
    },
    TrackSelected {
        track: Track,
    },
    OnboardingCompleted,
    Reset,
}

/// Notification delivered to subscribers after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub change: ProgressChange,
    /// Progress after the mutation.
    pub progress: UserProgress,
    pub at: DateTime<Utc>,
}

/// Handle returned by [`ProgressController::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ProgressEvent)>;

/// A submission accepted by [`ProgressController::begin_submission`].
///
/// It becomes ready once the simulated delay has elapsed and must be passed
/// back to [`ProgressController::finish_submission`] or
/// [`ProgressController::abandon_submission`]. Dropping it also releases the
/// controller's busy guard.
#[derive(Debug)]
pub struct PendingSubmission {
    lesson_id: String,
    code: String,
    ready_at: Instant,
    token: Rc<()>,
}

impl PendingSubmission {
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn ready_at(&self) -> Instant {
        self.ready_at
    }

    /// Time left before the submission is ready.
    pub fn remaining(&self) -> Duration {
        self.ready_at.saturating_duration_since(Instant::now())
    }

    pub fn is_ready(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// The controller's side of a pending submission.
#[derive(Debug)]
struct InFlight {
    lesson_id: String,
    token: Weak<()>,
}

impl InFlight {
    /// The pending handle has not been dropped.
    fn is_live(&self) -> bool {
        self.token.strong_count() > 0
    }

    fn owns(&self, pending: &PendingSubmission) -> bool {
        self.lesson_id == pending.lesson_id
            && self
                .token
                .upgrade()
                .is_some_and(|token| Rc::ptr_eq(&token, &pending.token))
    }
}

/// Result of a finished submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionOutcome {
    pub lesson_id: String,
    pub success: bool,
    /// Encouraging text for the learner.
    pub message: String,
    /// The lesson was not completed before this submission.
    pub newly_completed: bool,
    /// Level number completed by this submission, if any.
    pub completed_level: Option<u32>,
    /// Badges earned by this submission.
    pub new_badges: Vec<Badge>,
}

impl SubmissionOutcome {
    fn failure(lesson_id: &str, message: impl Into<String>) -> Self {
        Self {
            lesson_id: lesson_id.to_string(),
            success: false,
            message: message.into(),
            newly_completed: false,
            completed_level: None,
            new_badges: Vec::new(),
        }
    }
}

/// Owns one learner's progress and serializes every mutation of it.
pub struct ProgressController<S: ProgressStore> {
    catalog: Catalog,
    progress: UserProgress,
    store: S,
    validator: Box<dyn LessonValidator>,
    evaluator: Box<dyn BadgeEvaluator>,
    gating_level: u32,
    delay: Duration,
    in_flight: Option<InFlight>,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    degraded: bool,
}

impl<S: ProgressStore> fmt::Debug for ProgressController<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressController")
            .field("progress", &self.progress)
            .field("gating_level", &self.gating_level)
            .field("delay", &self.delay)
            .field("in_flight", &self.in_flight)
            .field("subscribers", &self.subscribers.len())
            .field("degraded", &self.degraded)
            .finish_non_exhaustive()
    }
}

impl<S: ProgressStore> ProgressController<S> {
    /// Create a controller and restore progress from `store`.
    ///
    /// A missing record starts fresh progress; an unreadable one is logged
    /// and replaced by fresh progress.
    pub fn new(catalog: Catalog, store: S) -> Self {
        let mut controller = Self {
            catalog,
            progress: UserProgress::new(),
            store,
            validator: Box::new(DefaultLessonValidator::new()),
            evaluator: Box::new(DefaultBadgeEvaluator::new()),
            gating_level: DEFAULT_GATING_LEVEL,
            delay: DEFAULT_DELAY,
            in_flight: None,
            subscribers: Vec::new(),
            next_subscription: 0,
            degraded: false,
        };
        controller.restore();
        controller
    }

    /// Create a controller using the validation and track settings of `config`.
    pub fn from_config(catalog: Catalog, store: S, config: &Config) -> Self {
        Self::new(catalog, store)
            .with_delay(Duration::from_millis(config.validation.delay_ms))
            .with_gating_level(config.tracks.gating_level)
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Change the simulated delay for later submissions.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    pub fn with_gating_level(mut self, gating_level: u32) -> Self {
        self.gating_level = gating_level;
        self
    }

    pub fn with_validator(mut self, validator: impl LessonValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    pub fn with_badge_evaluator(mut self, evaluator: impl BadgeEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Reload progress from the store, falling back to fresh progress.
    pub fn restore(&mut self) {
        self.progress = self
            .store
            .load()
            .fail_open_default("restoring progress")
            .unwrap_or_default();
        tracing::debug!(
            lessons = self.progress.completed_lessons_count(),
            levels = self.progress.completed_levels_count(),
            "restored progress"
        );
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn gating_level(&self) -> u32 {
        self.gating_level
    }

    /// Whether saving has been given up for this session.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Whether a submission is in flight.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.as_ref().is_some_and(InFlight::is_live)
    }

    /// Unlock rules evaluated against the current progress.
    pub fn unlocker(&self) -> Unlocker<'_> {
        Unlocker::with_gating_level(&self.catalog, &self.progress, self.gating_level)
    }

    pub fn navigation_guard(&self) -> NavigationGuard<'_> {
        NavigationGuard::new(&self.catalog, self.unlocker())
    }

    pub fn is_level_unlocked(&self, level: &Level) -> bool {
        self.unlocker().is_level_unlocked(level)
    }

    pub fn is_level_completed(&self, level: &Level) -> bool {
        self.unlocker().is_level_completed(level)
    }

    pub fn is_lesson_unlocked(&self, lesson: &Lesson, level: &Level) -> bool {
        self.unlocker().is_lesson_unlocked(lesson, level)
    }

    pub fn is_track_unlocked(&self, track: Track) -> bool {
        self.unlocker().is_track_unlocked(track)
    }

    pub fn lesson_state(&self, lesson: &Lesson, level: &Level) -> LessonState {
        self.unlocker().lesson_state(lesson, level)
    }

    pub fn level_state(&self, level: &Level) -> LevelState {
        self.unlocker().level_state(level)
    }

    pub fn completed_lessons_in_level(&self, level: &Level) -> usize {
        self.unlocker().completed_lessons_in_level(level)
    }

    pub fn earned_badges(&self) -> Vec<&Badge> {
        badges::earned_badges(self.catalog.badges(), &self.progress)
    }

    pub fn locked_badges(&self) -> Vec<&Badge> {
        badges::locked_badges(self.catalog.badges(), &self.progress)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Register a callback run after each successful mutation.
    pub fn subscribe(&mut self, callback: impl FnMut(&ProgressEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, change: ProgressChange) {
        if self.subscribers.is_empty() {
            return;
        }
        let event = ProgressEvent {
            change,
            progress: self.progress.clone(),
            at: Utc::now(),
        };
        for (_, callback) in &mut self.subscribers {
            callback(&event);
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Accept code for a lesson and arm the busy guard.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error while another submission is in
    /// flight, and a not-found error for an unknown lesson. A guard whose
    /// pending handle was dropped is reclaimed.
    pub fn begin_submission(
        &mut self,
        lesson_id: &str,
        code: impl Into<String>,
    ) -> Result<PendingSubmission> {
        if let Some(current) = self.in_flight.as_ref().filter(|f| f.is_live()) {
            return Err(StepwiseError::invalid_state(format!(
                "a submission for lesson '{}' is already in progress",
                current.lesson_id
            )));
        }
        if let Some(stale) = self.in_flight.take() {
            tracing::debug!(lesson = %stale.lesson_id, "reclaiming dropped submission");
        }
        if self.catalog.lesson(lesson_id).is_none() {
            return Err(StepwiseError::not_found("lesson", lesson_id));
        }

        let token = Rc::new(());
        self.in_flight = Some(InFlight {
            lesson_id: lesson_id.to_string(),
            token: Rc::downgrade(&token),
        });
        tracing::debug!(lesson = lesson_id, delay_ms = self.delay.as_millis() as u64, "submission started");

        Ok(PendingSubmission {
            lesson_id: lesson_id.to_string(),
            code: code.into(),
            ready_at: Instant::now() + self.delay,
            token,
        })
    }

    /// Give up on a pending submission without validating it.
    ///
    /// Returns whether it was the submission in flight.
    pub fn abandon_submission(&mut self, pending: PendingSubmission) -> bool {
        let owned = self.in_flight.as_ref().is_some_and(|f| f.owns(&pending));
        if owned {
            self.in_flight = None;
            tracing::debug!(lesson = %pending.lesson_id, "submission abandoned");
        }
        owned
    }

    /// Validate and apply a submission once its delay has elapsed.
    ///
    /// Blocks the calling thread for whatever is left of the delay. Callers
    /// that must not block should poll [`PendingSubmission::is_ready`] and
    /// only call this once it returns true. The busy guard is released
    /// whatever the outcome.
    pub fn finish_submission(&mut self, pending: PendingSubmission) -> Result<SubmissionOutcome> {
        if !self.in_flight.as_ref().is_some_and(|f| f.owns(&pending)) {
            return Err(StepwiseError::invalid_state(format!(
                "no submission for lesson '{}' is in progress",
                pending.lesson_id
            )));
        }

        let remaining = pending.remaining();
        if !remaining.is_zero() {
            thread::sleep(remaining);
        }

        let result = self.apply_submission(&pending.lesson_id, &pending.code);
        self.in_flight = None;
        result
    }

    /// Run both submission phases back to back.
    pub fn submit_code(&mut self, lesson_id: &str, code: &str) -> Result<SubmissionOutcome> {
        let pending = self.begin_submission(lesson_id, code)?;
        self.finish_submission(pending)
    }

    fn apply_submission(&mut self, lesson_id: &str, code: &str) -> Result<SubmissionOutcome> {
        let (level, lesson) = self
            .catalog
            .lesson(lesson_id)
            .ok_or_else(|| StepwiseError::not_found("lesson", lesson_id))?;

        let outcome = self.validator.validate(code, lesson);
        if let Some(message) = outcome.message() {
            tracing::debug!(lesson = lesson_id, "submission rejected");
            return Ok(SubmissionOutcome::failure(lesson_id, message));
        }

        let newly_completed = self.progress.complete_lesson(lesson_id);

        let level_number = level.level_number;
        let track = level.track;
        let level_done = self.unlocker().is_level_completed(level);

        let mut completed_level = None;
        if level_done && self.progress.complete_level(level_number) {
            tracing::info!(level = level_number, track = %track, "level completed");
            completed_level = Some(level_number);

            let next = level_number + 1;
            if self.catalog.level(track, next).is_some() {
                self.progress.advance_current_level(next);
            }
        }

        let new_badges: Vec<Badge> =
            badges::newly_unlocked(self.evaluator.as_ref(), self.catalog.badges(), &self.progress)
                .into_iter()
                .cloned()
                .collect();
        for badge in &new_badges {
            self.progress.earn_badge(badge.id.clone());
            tracing::info!(badge = %badge.id, "badge earned");
        }

        self.persist();
        self.notify(ProgressChange::LessonCompleted {
            lesson_id: lesson_id.to_string(),
            completed_level,
            new_badge_ids: new_badges.iter().map(|b| b.id.clone()).collect(),
        });

        Ok(SubmissionOutcome {
            lesson_id: lesson_id.to_string(),
            success: true,
            message: SUCCESS_MESSAGE.to_string(),
            newly_completed,
            completed_level,
            new_badges,
        })
    }

    // =========================================================================
    // Other mutations
    // =========================================================================

    /// Select a track. Returns whether the selection changed.
    pub fn select_track(&mut self, track: Track) -> bool {
        let changed = self.progress.select_track(track);
        tracing::debug!(track = %track, changed, "track selected");
        self.persist();
        self.notify(ProgressChange::TrackSelected { track });
        changed
    }

    /// Mark onboarding complete. Returns whether the flag changed.
    pub fn complete_onboarding(&mut self) -> bool {
        let changed = self.progress.complete_onboarding();
        self.persist();
        self.notify(ProgressChange::OnboardingCompleted);
        changed
    }

    /// Clear completions, badges and onboarding, keeping the selected track.
    pub fn reset_progress(&mut self) {
        self.progress.reset();
        tracing::debug!("progress reset");
        self.persist();
        self.notify(ProgressChange::Reset);
    }

    /// Remove the stored record, then reset progress.
    ///
    /// If the record cannot be removed, progress is left untouched.
    pub fn clear_stored_progress(&mut self) -> Result<()> {
        self.store.clear()?;
        self.progress.reset();
        tracing::debug!("stored progress cleared");
        self.notify(ProgressChange::Reset);
        Ok(())
    }

    fn persist(&mut self) {
        if self.degraded {
            tracing::debug!("persistence disabled for this session, keeping progress in memory");
            return;
        }
        if let Err(e) = self.store.save(&self.progress) {
            tracing::warn!(error = %e, "failed to save progress, continuing in memory only");
            self.degraded = true;
        }
    }
}
