//! Status command for Stepwise.
//!
//! Shows every track, level and lesson with its current state plus the
//! learner's aggregate counts.

use serde::Serialize;

use crate::config::Config;
use crate::core::{
    Catalog, LessonState, LevelState, ProgressController, Track, UserMessage,
};
use crate::storage::ProgressStore;

/// Options for the status command.
#[derive(Debug, Clone, Default)]
pub struct StatusOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Only show this track.
    pub track: Option<Track>,
}

/// One lesson in the status listing.
#[derive(Debug, Clone, Serialize)]
pub struct LessonStatus {
    pub id: String,
    pub title: String,
    pub state: LessonState,
    pub interactive: bool,
    pub estimated_minutes: u32,
}

/// One level in the status listing.
#[derive(Debug, Clone, Serialize)]
pub struct LevelStatus {
    pub id: String,
    pub level_number: u32,
    pub title: String,
    pub state: LevelState,
    pub completed_lessons: usize,
    pub lesson_count: usize,
    pub lessons: Vec<LessonStatus>,
}

/// One track in the status listing.
#[derive(Debug, Clone, Serialize)]
pub struct TrackStatus {
    pub track: Track,
    pub title: String,
    pub unlocked: bool,
    pub selected: bool,
    pub levels: Vec<LevelStatus>,
}

/// Output format for the status command.
#[derive(Debug, Clone, Serialize)]
pub struct StatusOutput {
    pub selected_track: Track,
    pub onboarding_completed: bool,
    pub current_level_number: u32,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub completed_levels: usize,
    pub earned_badges: usize,
    pub tracks: Vec<TrackStatus>,
    /// Encouragement shown when nothing has been completed yet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The status command implementation.
pub struct StatusCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> StatusCommand<S> {
    /// Create a new status command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the status command.
    pub fn run(&self, options: &StatusOptions) -> StatusOutput {
        let controller = &self.controller;
        let catalog = controller.catalog();
        let progress = controller.progress();

        let tracks: Vec<TrackStatus> = Track::ALL
            .iter()
            .filter(|track| options.track.is_none_or(|only| only == **track))
            .map(|&track| TrackStatus {
                track,
                title: track.title().to_string(),
                unlocked: controller.is_track_unlocked(track),
                selected: progress.selected_track() == track,
                levels: catalog
                    .levels_for_track(track)
                    .into_iter()
                    .map(|level| LevelStatus {
                        id: level.id.clone(),
                        level_number: level.level_number,
                        title: level.title.clone(),
                        state: controller.level_state(level),
                        completed_lessons: controller.completed_lessons_in_level(level),
                        lesson_count: level.lesson_count(),
                        lessons: level
                            .lessons
                            .iter()
                            .map(|lesson| LessonStatus {
                                id: lesson.id.clone(),
                                title: lesson.title.clone(),
                                state: controller.lesson_state(lesson, level),
                                interactive: lesson.is_interactive(),
                                estimated_minutes: lesson.estimated_minutes,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let total_lessons = catalog.levels().iter().map(|l| l.lesson_count()).sum();
        let message = if catalog.levels().is_empty() {
            Some(UserMessage::NoLevelsAvailable.message().to_string())
        } else if progress.completed_lessons_count() == 0 {
            Some(UserMessage::NoProgressYet.message().to_string())
        } else {
            None
        };

        StatusOutput {
            selected_track: progress.selected_track(),
            onboarding_completed: progress.has_completed_onboarding(),
            current_level_number: progress.current_level_number(),
            completed_lessons: progress.completed_lessons_count(),
            total_lessons,
            completed_levels: progress.completed_levels_count(),
            earned_badges: progress.earned_badges_count(),
            tracks,
            message,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatusOutput, options: &StatusOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &StatusOutput) -> String {
        let mut out = format!(
            "Progress: {}/{} lessons, {} levels, {} badges\n",
            output.completed_lessons,
            output.total_lessons,
            output.completed_levels,
            output.earned_badges
        );
        if let Some(message) = &output.message {
            out.push_str(message);
            out.push('\n');
        }

        for track in &output.tracks {
            let marker = if track.selected { "*" } else { " " };
            let lock = if track.unlocked { "" } else { " [locked]" };
            out.push_str(&format!("\n{} {}{}\n", marker, track.title, lock));

            for level in &track.levels {
                out.push_str(&format!(
                    "  Level {}: {} ({}/{}) [{}]\n",
                    level.level_number,
                    level.title,
                    level.completed_lessons,
                    level.lesson_count,
                    level.state.as_str()
                ));
                for lesson in &level.lessons {
                    out.push_str(&format!(
                        "    {:<10} {} ({})\n",
                        lesson.state.as_str(),
                        lesson.title,
                        lesson.id
                    ));
                }
            }
        }

        out
    }
}
