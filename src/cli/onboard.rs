//! Onboard command for Stepwise.
//!
//! Marks the welcome flow as finished.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Catalog, ProgressController};
use crate::storage::ProgressStore;

/// Options for the onboard command.
#[derive(Debug, Clone, Default)]
pub struct OnboardOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the onboard command.
#[derive(Debug, Clone, Serialize)]
pub struct OnboardOutput {
    pub success: bool,
    /// Onboarding was not completed before.
    pub changed: bool,
    pub persisted: bool,
}

/// The onboard command implementation.
pub struct OnboardCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> OnboardCommand<S> {
    /// Create a new onboard command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the onboard command.
    pub fn run(&mut self) -> OnboardOutput {
        let changed = self.controller.complete_onboarding();
        OnboardOutput {
            success: true,
            changed,
            persisted: !self.controller.is_degraded(),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &OnboardOutput, options: &OnboardOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.changed {
            "Welcome aboard! Your journey begins with the first lesson.\n".to_string()
        } else {
            "Onboarding already completed.\n".to_string()
        }
    }
}
