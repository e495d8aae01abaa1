//! Badge rule evaluation.
//!
//! The evaluator is stateless: it reports which badges are satisfied by a
//! progress snapshot and leaves diffing against earned ids to the caller.

use crate::core::content::{Badge, BadgeRule};
use crate::core::progress::UserProgress;

/// Decides which badges a progress snapshot satisfies.
pub trait BadgeEvaluator {
    /// Badges whose rule holds for `progress`, in catalog order.
    fn unlocked_badges<'a>(&self, badges: &'a [Badge], progress: &UserProgress) -> Vec<&'a Badge>;
}

/// Rule-driven evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBadgeEvaluator;

impl DefaultBadgeEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl BadgeEvaluator for DefaultBadgeEvaluator {
    fn unlocked_badges<'a>(&self, badges: &'a [Badge], progress: &UserProgress) -> Vec<&'a Badge> {
        badges
            .iter()
            .filter(|badge| badge.rule.is_some_and(|rule| rule_satisfied(rule, progress)))
            .collect()
    }
}

/// Whether a single rule holds for `progress`.
pub fn rule_satisfied(rule: BadgeRule, progress: &UserProgress) -> bool {
    match rule {
        BadgeRule::CompleteLevel { level_number } => progress.is_level_number_completed(level_number),
        BadgeRule::CompleteLessons { count } => progress.completed_lessons_count() >= count as usize,
        // Selected track stands in for finishing it.
        BadgeRule::CompleteTrack { track } => progress.selected_track() == track,
        BadgeRule::FirstLesson => progress.completed_lessons_count() >= 1,
        BadgeRule::StreakDays { .. } => false,
    }
}

/// Badges satisfied now that are not yet recorded as earned.
pub fn newly_unlocked<'a, E: BadgeEvaluator + ?Sized>(
    evaluator: &E,
    badges: &'a [Badge],
    progress: &UserProgress,
) -> Vec<&'a Badge> {
    evaluator
        .unlocked_badges(badges, progress)
        .into_iter()
        .filter(|badge| !progress.has_badge(&badge.id))
        .collect()
}

/// Catalog badges already earned, in catalog order.
pub fn earned_badges<'a>(badges: &'a [Badge], progress: &UserProgress) -> Vec<&'a Badge> {
    badges.iter().filter(|b| progress.has_badge(&b.id)).collect()
}

/// Catalog badges not yet earned, in catalog order.
pub fn locked_badges<'a>(badges: &'a [Badge], progress: &UserProgress) -> Vec<&'a Badge> {
    badges.iter().filter(|b| !progress.has_badge(&b.id)).collect()
}
