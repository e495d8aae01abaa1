//! Hint command for Stepwise.
//!
//! Looks up a lesson hint by position. Out-of-range positions get a gentle
//! fallback instead of an error.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Catalog, ProgressController};
use crate::storage::ProgressStore;

/// Options for the hint command.
#[derive(Debug, Clone, Default)]
pub struct HintOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Zero-based hint position.
    pub index: usize,
}

/// Output format for the hint command.
#[derive(Debug, Clone, Serialize)]
pub struct HintOutput {
    pub success: bool,
    pub lesson_id: String,
    pub index: usize,
    pub hint_count: usize,
    pub hint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HintOutput {
    /// Create a failed output.
    pub fn failure(lesson_id: &str, error: impl Into<String>) -> Self {
        Self {
            success: false,
            lesson_id: lesson_id.to_string(),
            index: 0,
            hint_count: 0,
            hint: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The hint command implementation.
pub struct HintCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> HintCommand<S> {
    /// Create a new hint command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the hint command.
    pub fn run(&self, lesson_id: &str, options: &HintOptions) -> HintOutput {
        let guard = self.controller.navigation_guard();
        match guard.check_lesson(lesson_id) {
            Ok((_, lesson)) => HintOutput {
                success: true,
                lesson_id: lesson.id.clone(),
                index: options.index,
                hint_count: lesson.hint_count(),
                hint: lesson.safe_hint(options.index).to_string(),
                error: None,
            },
            Err(message) => HintOutput::failure(lesson_id, message.message()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HintOutput, options: &HintOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            if output.index < output.hint_count {
                format!(
                    "Hint {}/{}: {}\n",
                    output.index + 1,
                    output.hint_count,
                    output.hint
                )
            } else {
                format!("{}\n", output.hint)
            }
        } else {
            format!("{}\n", output.error.as_deref().unwrap_or("unknown error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{UserMessage, NO_MORE_HINTS};
    use crate::storage::MemoryProgressStore;

    fn command() -> HintCommand<MemoryProgressStore> {
        HintCommand::new(
            MemoryProgressStore::new(),
            Catalog::builtin(),
            Config::default(),
        )
    }

    #[test]
    fn test_first_hint() {
        let output = command().run("swift-0-variables", &HintOptions::default());

        assert!(output.success);
        assert_eq!(output.hint_count, 2);
        assert_eq!(output.hint, "Text goes between double quotes");
    }

    #[test]
    fn test_out_of_range_hint_falls_back() {
        let options = HintOptions {
            index: 5,
            ..Default::default()
        };
        let cmd = command();
        let output = cmd.run("swift-0-variables", &options);

        assert!(output.success);
        assert_eq!(output.hint, NO_MORE_HINTS);
        assert_eq!(cmd.format_output(&output, &options), format!("{}\n", NO_MORE_HINTS));
    }

    #[test]
    fn test_locked_lesson_hint_refused() {
        let output = command().run("swift-1-arrays", &HintOptions::default());

        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some(UserMessage::LevelLocked.message()));
    }

    #[test]
    fn test_unknown_lesson() {
        let output = command().run("missing", &HintOptions::default());
        assert_eq!(
            output.error.as_deref(),
            Some(UserMessage::LessonNotFound.message())
        );
    }

    #[test]
    fn test_format_output_human_readable() {
        let cmd = command();
        let options = HintOptions {
            index: 1,
            ..Default::default()
        };
        let output = cmd.run("swift-0-variables", &options);

        assert_eq!(
            cmd.format_output(&output, &options),
            "Hint 2/2: Put Hello, World! inside the empty quotes\n"
        );
    }

    #[test]
    fn test_format_output_json() {
        let cmd = command();
        let options = HintOptions {
            json: true,
            ..Default::default()
        };
        let formatted = cmd.format_output(&cmd.run("swift-0-variables", &options), &options);
        assert!(formatted.contains("\"hint_count\": 2"));
    }
}
