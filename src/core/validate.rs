//! Lesson validation.
//!
//! Submitted code is never executed. It is compared against the lesson's
//! expected solution after normalization.

use serde::{Deserialize, Serialize};

use crate::core::content::Lesson;

/// Message returned for every failed validation.
pub const VALIDATION_FAILURE_MESSAGE: &str = "Almost there. Try checking your syntax or logic.";

/// Result of checking a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Success,
    Failure { message: String },
}

impl ValidationOutcome {
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::Failure { message } => Some(message),
        }
    }
}

/// Checks a code submission against a lesson.
///
/// Implementations must be deterministic and must not block.
pub trait LessonValidator {
    fn validate(&self, code: &str, lesson: &Lesson) -> ValidationOutcome;
}

/// Whitespace-insensitive, case-insensitive containment check.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLessonValidator;

impl DefaultLessonValidator {
    pub fn new() -> Self {
        Self
    }
}

impl LessonValidator for DefaultLessonValidator {
    fn validate(&self, code: &str, lesson: &Lesson) -> ValidationOutcome {
        let Some(solution) = lesson.solution.as_deref() else {
            return ValidationOutcome::Success;
        };

        if normalize(code).contains(&normalize(solution)) {
            ValidationOutcome::Success
        } else {
            ValidationOutcome::failure(VALIDATION_FAILURE_MESSAGE)
        }
    }
}

/// Drop every whitespace character and lowercase the rest.
pub fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson_with_solution(solution: &str) -> Lesson {
        Lesson::new("vars", "Variables", "", "Use var.")
            .with_challenge("Declare a greeting", solution)
    }

    #[test]
    fn test_normalize_strips_whitespace_and_case() {
        assert_eq!(normalize("  Let X\t=\n 1 "), "letx=1");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_matching_submission_succeeds() {
        let lesson = lesson_with_solution("var message = \"Hello, World!\"");
        let outcome = DefaultLessonValidator::new()
            .validate("VAR message=\"hello,world!\"\n", &lesson);

        assert_eq!(outcome, ValidationOutcome::Success);
        assert!(outcome.message().is_none());
    }

    #[test]
    fn test_submission_containing_solution_succeeds() {
        let lesson = lesson_with_solution("let name = \"Swift\"");
        let code = "// my answer\nlet name = \"Swift\"\nprint(name)";

        assert!(DefaultLessonValidator::new().validate(code, &lesson).is_success());
    }

    #[test]
    fn test_wrong_submission_fails_with_message() {
        let lesson = lesson_with_solution("let x = 1");
        let outcome = DefaultLessonValidator::new().validate("let x = 2", &lesson);

        assert!(!outcome.is_success());
        assert_eq!(outcome.message(), Some(VALIDATION_FAILURE_MESSAGE));
    }

    #[test]
    fn test_var_does_not_satisfy_let() {
        let lesson = lesson_with_solution("let a = 5");
        let outcome = DefaultLessonValidator::new().validate("var a = 5", &lesson);

        assert_eq!(outcome.message(), Some(VALIDATION_FAILURE_MESSAGE));
    }

    #[test]
    fn test_spacing_is_ignored() {
        let lesson = lesson_with_solution("let a = 5");

        assert!(DefaultLessonValidator::new()
            .validate(" let  a=5 ", &lesson)
            .is_success());
    }

    #[test]
    fn test_empty_submission_fails_when_solution_expected() {
        let lesson = lesson_with_solution("let x = 1");
        assert!(!DefaultLessonValidator::new().validate("", &lesson).is_success());
    }

    #[test]
    fn test_no_solution_always_succeeds() {
        let lesson = Lesson::new("theory", "Optionals", "", "Read about optionals.");

        assert!(DefaultLessonValidator::new().validate("", &lesson).is_success());
        assert!(DefaultLessonValidator::new()
            .validate("anything at all", &lesson)
            .is_success());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(ValidationOutcome::failure("nope")).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["message"], "nope");

        let json = serde_json::to_value(ValidationOutcome::Success).unwrap();
        assert_eq!(json["status"], "success");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            // Property: inserting whitespace or changing case never breaks a match
            #[test]
            fn prop_whitespace_and_case_insensitive(
                solution in "[a-z=\"]{1,12}",
                spaces in prop::collection::vec(0usize..3, 12),
            ) {
                let lesson = lesson_with_solution(&solution);
                let code: String = solution
                    .chars()
                    .zip(spaces.iter().cycle())
                    .map(|(c, n)| format!("{}{}", c.to_ascii_uppercase(), " ".repeat(*n)))
                    .collect();

                prop_assert!(DefaultLessonValidator::new().validate(&code, &lesson).is_success());
            }

            // Property: validation is deterministic
            #[test]
            fn prop_deterministic(code in ".{0,40}", solution in ".{0,20}") {
                let lesson = lesson_with_solution(&solution);
                let validator = DefaultLessonValidator::new();
                prop_assert_eq!(
                    validator.validate(&code, &lesson),
                    validator.validate(&code, &lesson)
                );
            }
        }
    }
}
