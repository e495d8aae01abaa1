//! Submit command for Stepwise.
//!
//! Checks a code submission for a lesson and records the lesson, level and
//! badges it earns.

use std::time::Duration;

use serde::Serialize;

use crate::config::Config;
use crate::core::{Catalog, ProgressController, UserMessage};
use crate::storage::ProgressStore;

/// Options for the submit command.
#[derive(Debug, Clone, Default)]
pub struct SubmitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Skip the simulated execution delay.
    pub no_delay: bool,
}

/// A badge as shown in command output.
#[derive(Debug, Clone, Serialize)]
pub struct EarnedBadge {
    pub id: String,
    pub title: String,
}

/// Output format for the submit command.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutput {
    /// Whether the submission passed.
    pub success: bool,
    pub lesson_id: String,
    /// Text for the learner.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_level: Option<u32>,
    pub new_badges: Vec<EarnedBadge>,
    /// False once saving has failed for this session.
    pub persisted: bool,
    /// Error message if the submission could not be checked.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubmitOutput {
    /// Create an output for a submission that was not checked.
    pub fn rejected(lesson_id: &str, message: UserMessage) -> Self {
        Self {
            success: false,
            lesson_id: lesson_id.to_string(),
            message: message.message().to_string(),
            completed_level: None,
            new_badges: Vec::new(),
            persisted: true,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(lesson_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            lesson_id: lesson_id.to_string(),
            message: UserMessage::NavigationError.message().to_string(),
            completed_level: None,
            new_badges: Vec::new(),
            persisted: true,
            error: Some(error.into()),
        }
    }
}

/// The submit command implementation.
pub struct SubmitCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> SubmitCommand<S> {
    /// Create a new submit command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Access the underlying controller.
    pub fn controller(&self) -> &ProgressController<S> {
        &self.controller
    }

    /// Run the submit command for `lesson_id` with the learner's code.
    pub fn run(&mut self, lesson_id: &str, code: &str, options: &SubmitOptions) -> SubmitOutput {
        if let Some(message) = self.precheck(lesson_id, code) {
            return SubmitOutput::rejected(lesson_id, message);
        }

        if options.no_delay {
            self.controller.set_delay(Duration::ZERO);
        }

        match self.controller.submit_code(lesson_id, code) {
            Ok(outcome) => SubmitOutput {
                success: outcome.success,
                lesson_id: outcome.lesson_id,
                message: outcome.message,
                completed_level: outcome.completed_level,
                new_badges: outcome
                    .new_badges
                    .into_iter()
                    .map(|b| EarnedBadge {
                        id: b.id,
                        title: b.title,
                    })
                    .collect(),
                persisted: !self.controller.is_degraded(),
                error: None,
            },
            Err(e) => SubmitOutput::failure(lesson_id, e.to_string()),
        }
    }

    /// Refuse submissions the learner should not be making yet.
    fn precheck(&self, lesson_id: &str, code: &str) -> Option<UserMessage> {
        let guard = self.controller.navigation_guard();
        let (_, lesson) = match guard.check_lesson(lesson_id) {
            Ok(found) => found,
            Err(message) => return Some(message),
        };

        if !lesson.is_interactive() {
            return None;
        }
        if code.trim().is_empty() {
            return Some(UserMessage::EmptyCodeEditor);
        }
        if lesson
            .code_challenge
            .as_deref()
            .is_some_and(|starter| !starter.trim().is_empty() && starter.trim() == code.trim())
        {
            return Some(UserMessage::NoCodeChange);
        }
        None
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &SubmitOutput, options: &SubmitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &SubmitOutput) -> String {
        if let Some(error) = &output.error {
            return format!("Submission failed: {}\n", error);
        }

        let mut out = format!("{}\n", output.message);
        if let Some(level) = output.completed_level {
            out.push_str(&format!("Level {} complete!\n", level));
        }
        for badge in &output.new_badges {
            out.push_str(&format!("Badge earned: {}\n", badge.title));
        }
        if !output.persisted {
            out.push_str("Warning: progress could not be saved and is kept in memory only.\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UserProgress;
    use crate::storage::MemoryProgressStore;
    use std::sync::Arc;

    fn setup() -> (SubmitCommand<Arc<MemoryProgressStore>>, Arc<MemoryProgressStore>) {
        let store = Arc::new(MemoryProgressStore::new());
        let cmd = SubmitCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());
        (cmd, store)
    }

    fn no_delay() -> SubmitOptions {
        SubmitOptions {
            no_delay: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_correct_code() {
        let (mut cmd, store) = setup();

        let output = cmd.run(
            "swift-0-variables",
            "var message = \"Hello, World!\"",
            &no_delay(),
        );

        assert!(output.success);
        assert!(output.persisted);
        assert_eq!(output.message, crate::core::SUCCESS_MESSAGE);
        assert!(output.new_badges.iter().any(|b| b.id == "first-steps"));
        assert!(store
            .snapshot()
            .unwrap()
            .is_lesson_completed("swift-0-variables"));
    }

    #[test]
    fn test_submit_wrong_code() {
        let (mut cmd, store) = setup();

        let output = cmd.run("swift-0-variables", "var message = \"Hi\"", &no_delay());

        assert!(!output.success);
        assert!(output.error.is_none());
        assert_eq!(output.message, crate::core::VALIDATION_FAILURE_MESSAGE);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_submit_empty_code() {
        let (mut cmd, _store) = setup();

        let output = cmd.run("swift-0-variables", "   \n", &no_delay());

        assert!(!output.success);
        assert_eq!(output.message, UserMessage::EmptyCodeEditor.message());
    }

    #[test]
    fn test_submit_unchanged_starter_code() {
        let (mut cmd, _store) = setup();

        let output = cmd.run("swift-0-variables", "var message = \"\"", &no_delay());

        assert_eq!(output.message, UserMessage::NoCodeChange.message());
    }

    #[test]
    fn test_submit_locked_lesson() {
        let (mut cmd, store) = setup();

        let output = cmd.run("swift-0-constants", "let name = \"Swift\"", &no_delay());

        assert!(!output.success);
        assert_eq!(output.message, UserMessage::LessonLocked.message());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_submit_unknown_lesson() {
        let (mut cmd, _store) = setup();

        let output = cmd.run("nope", "code", &no_delay());

        assert_eq!(output.message, UserMessage::LessonNotFound.message());
    }

    #[test]
    fn test_submit_theory_lesson_without_code() {
        let mut progress = UserProgress::new();
        for id in ["swift-0-variables", "swift-0-constants", "swift-0-numbers"] {
            progress.complete_lesson(id);
        }
        progress.complete_level(0);
        let store = Arc::new(MemoryProgressStore::with_progress(progress));
        let mut cmd = SubmitCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());

        let output = cmd.run("swift-1-optionals", "", &no_delay());

        assert!(output.success);
        assert!(cmd.controller().progress().is_lesson_completed("swift-1-optionals"));
    }

    #[test]
    fn test_submit_completes_level() {
        let (mut cmd, _store) = setup();
        let options = no_delay();

        cmd.run("swift-0-variables", "var message = \"Hello, World!\"", &options);
        cmd.run("swift-0-constants", "let name = \"Swift\"", &options);
        let output = cmd.run("swift-0-numbers", "let result = 10", &options);

        assert_eq!(output.completed_level, Some(0));
        let ids: Vec<&str> = output.new_badges.iter().map(|b| b.id.as_str()).collect();
        assert!(ids.contains(&"warmed-up"));
        assert!(ids.contains(&"swift-basics"));
    }

    #[test]
    fn test_submit_reports_degraded_persistence() {
        let store = Arc::new(MemoryProgressStore::failing());
        let mut cmd = SubmitCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());

        let output = cmd.run(
            "swift-0-variables",
            "var message = \"Hello, World!\"",
            &no_delay(),
        );

        assert!(output.success);
        assert!(!output.persisted);
        assert!(cmd
            .format_output(&output, &SubmitOptions::default())
            .contains("kept in memory only"));
    }

    #[test]
    fn test_format_output_json() {
        let (cmd, _store) = setup();
        let output = SubmitOutput::rejected("x", UserMessage::LessonLocked);
        let options = SubmitOptions {
            json: true,
            ..Default::default()
        };

        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.contains("\"success\": false"));
        assert!(formatted.contains("\"lesson_id\": \"x\""));
    }

    #[test]
    fn test_format_output_quiet() {
        let (cmd, _store) = setup();
        let output = SubmitOutput::failure("x", "boom");
        let options = SubmitOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd.format_output(&output, &options).is_empty());
    }

    #[test]
    fn test_format_output_failure() {
        let (cmd, _store) = setup();
        let output = SubmitOutput::failure("x", "boom");

        let formatted = cmd.format_output(&output, &SubmitOptions::default());
        assert_eq!(formatted, "Submission failed: boom\n");
    }
}
