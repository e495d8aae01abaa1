//! Reset command for Stepwise.
//!
//! Starts the curriculum over. The selected track is kept.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Catalog, ProgressController, Track};
use crate::storage::ProgressStore;

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Remove the stored record instead of saving an empty one.
    pub clear: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize)]
pub struct ResetOutput {
    pub success: bool,
    /// The stored record was removed.
    pub cleared: bool,
    pub selected_track: Track,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The reset command implementation.
pub struct ResetCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> ResetCommand<S> {
    /// Create a new reset command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the reset command.
    pub fn run(&mut self, options: &ResetOptions) -> ResetOutput {
        let result = if options.clear {
            self.controller.clear_stored_progress()
        } else {
            self.controller.reset_progress();
            Ok(())
        };

        let selected_track = self.controller.progress().selected_track();
        match result {
            Ok(()) => ResetOutput {
                success: true,
                cleared: options.clear,
                selected_track,
                error: None,
            },
            Err(e) => ResetOutput {
                success: false,
                cleared: false,
                selected_track,
                error: Some(e.to_string()),
            },
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            let what = if output.cleared {
                "Progress cleared"
            } else {
                "Progress reset"
            };
            format!("{}. Still on {}.\n", what, output.selected_track.title())
        } else {
            format!(
                "Reset failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}
