//! Badges command for Stepwise.
//!
//! Lists earned and still-locked badges.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Badge, Catalog, ProgressController, UserMessage};
use crate::storage::ProgressStore;

/// Options for the badges command.
#[derive(Debug, Clone, Default)]
pub struct BadgesOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// A badge entry in the listing.
#[derive(Debug, Clone, Serialize)]
pub struct BadgeEntry {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub unlock_condition: String,
}

impl From<&Badge> for BadgeEntry {
    fn from(badge: &Badge) -> Self {
        Self {
            id: badge.id.clone(),
            title: badge.title.clone(),
            description: badge.description.clone(),
            icon: badge.icon.clone(),
            unlock_condition: badge.unlock_condition.clone(),
        }
    }
}

/// Output format for the badges command.
#[derive(Debug, Clone, Serialize)]
pub struct BadgesOutput {
    pub earned: Vec<BadgeEntry>,
    pub locked: Vec<BadgeEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The badges command implementation.
pub struct BadgesCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> BadgesCommand<S> {
    /// Create a new badges command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the badges command.
    pub fn run(&self) -> BadgesOutput {
        let earned: Vec<BadgeEntry> = self
            .controller
            .earned_badges()
            .into_iter()
            .map(BadgeEntry::from)
            .collect();
        let locked = self
            .controller
            .locked_badges()
            .into_iter()
            .map(BadgeEntry::from)
            .collect();

        let message = earned
            .is_empty()
            .then(|| UserMessage::NoBadgesYet.message().to_string());

        BadgesOutput {
            earned,
            locked,
            message,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &BadgesOutput, options: &BadgesOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string());
        }

        let mut out = format!("Earned ({}):\n", output.earned.len());
        if let Some(message) = &output.message {
            out.push_str(&format!("  {}\n", message));
        }
        for badge in &output.earned {
            out.push_str(&format!("  {} - {}\n", badge.title, badge.description));
        }
        out.push_str(&format!("\nLocked ({}):\n", output.locked.len()));
        for badge in &output.locked {
            out.push_str(&format!("  {} - {}\n", badge.title, badge.unlock_condition));
        }
        out
    }
}
