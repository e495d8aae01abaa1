//! Track command for Stepwise.
//!
//! Selects the learning path. Locked tracks are refused.

use serde::Serialize;

use crate::config::Config;
use crate::core::{Catalog, ProgressController, Track};
use crate::storage::ProgressStore;

/// Options for the track command.
#[derive(Debug, Clone, Default)]
pub struct TrackOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the track command.
#[derive(Debug, Clone, Serialize)]
pub struct TrackOutput {
    pub success: bool,
    pub track: Track,
    pub title: String,
    /// The selection differed from the previous one.
    pub changed: bool,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The track command implementation.
pub struct TrackCommand<S: ProgressStore> {
    controller: ProgressController<S>,
}

impl<S: ProgressStore> TrackCommand<S> {
    /// Create a new track command.
    pub fn new(store: S, catalog: Catalog, config: Config) -> Self {
        Self {
            controller: ProgressController::from_config(catalog, store, &config),
        }
    }

    /// Run the track command.
    pub fn run(&mut self, track: Track) -> TrackOutput {
        if let Err(message) = self.controller.navigation_guard().check_track(track) {
            return TrackOutput {
                success: false,
                track,
                title: track.title().to_string(),
                changed: false,
                persisted: true,
                error: Some(message.message().to_string()),
            };
        }

        let changed = self.controller.select_track(track);
        TrackOutput {
            success: true,
            track,
            title: track.title().to_string(),
            changed,
            persisted: !self.controller.is_degraded(),
            error: None,
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &TrackOutput, options: &TrackOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            let mut out = format!("Now learning: {}\n", output.title);
            if !output.persisted {
                out.push_str("Warning: progress could not be saved and is kept in memory only.\n");
            }
            out
        } else {
            format!("{}\n", output.error.as_deref().unwrap_or("unknown error"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{UserMessage, UserProgress};
    use crate::storage::MemoryProgressStore;
    use std::sync::Arc;

    #[test]
    fn test_select_primary_track() {
        let store = Arc::new(MemoryProgressStore::new());
        let mut cmd = TrackCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());

        let output = cmd.run(Track::Swift);

        assert!(output.success);
        assert!(!output.changed);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_locked_track_refused() {
        let store = Arc::new(MemoryProgressStore::new());
        let mut cmd = TrackCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());

        let output = cmd.run(Track::SwiftUi);

        assert!(!output.success);
        assert_eq!(output.error.as_deref(), Some(UserMessage::TrackLocked.message()));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_unlocked_secondary_track_selected() {
        let mut progress = UserProgress::new();
        progress.complete_lesson("swift-2-protocols");
        let store = Arc::new(MemoryProgressStore::with_progress(progress));
        let mut cmd = TrackCommand::new(Arc::clone(&store), Catalog::builtin(), Config::default());

        let output = cmd.run(Track::SwiftUi);

        assert!(output.success);
        assert!(output.changed);
        assert_eq!(store.snapshot().unwrap().selected_track(), Track::SwiftUi);
        assert_eq!(
            cmd.format_output(&output, &TrackOptions::default()),
            "Now learning: SwiftUI Framework\n"
        );
    }

    #[test]
    fn test_format_output_json() {
        let mut cmd = TrackCommand::new(
            MemoryProgressStore::new(),
            Catalog::builtin(),
            Config::default(),
        );
        let output = cmd.run(Track::Swift);
        let options = TrackOptions {
            json: true,
            ..Default::default()
        };

        assert!(cmd
            .format_output(&output, &options)
            .contains("\"track\": \"swift\""));
    }
}
