//! CLI commands for Stepwise.
//!
//! - **Learning commands**: status, submit, hint, badges
//! - **Progress commands**: track, onboard, reset

// Learning commands
pub mod badges_cmd;
pub mod hint;
pub mod status;
pub mod submit;

// Progress commands
pub mod onboard;
pub mod reset;
pub mod track;

pub use badges_cmd::BadgesCommand;
pub use hint::HintCommand;
pub use onboard::OnboardCommand;
pub use reset::ResetCommand;
pub use status::StatusCommand;
pub use submit::SubmitCommand;
pub use track::TrackCommand;
