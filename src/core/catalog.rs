//! The content catalog: every level and badge the engine knows about.
//!
//! The catalog is read-only after construction. It is either the built-in
//! reference curriculum or a JSON document supplied by the host app.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::content::{Badge, BadgeRule, Lesson, Level, Track};
use crate::error::{Result, StepwiseError};
use crate::util::read_to_string_limited;

/// Immutable collection of levels (across all tracks) and badges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    levels: Vec<Level>,
    #[serde(default)]
    badges: Vec<Badge>,
}

impl Catalog {
    /// Create a catalog from already-built content.
    pub fn new(levels: Vec<Level>, badges: Vec<Badge>) -> Self {
        Self { levels, badges }
    }

    /// Parse a catalog from its JSON form.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| StepwiseError::content(format!("invalid catalog: {}", e)))?;
        catalog.warn_invalid_levels();
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = read_to_string_limited(path)?;
        Self::from_json_str(&json)
    }

    /// Load the catalog at `path`, or the built-in one when no path is
    /// given or the file cannot be used.
    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        match path {
            Some(path) => match Self::load_from_file(path) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to load content catalog, using built-in content"
                    );
                    Self::builtin()
                }
            },
            None => Self::builtin(),
        }
    }

    /// All levels, in authoring order.
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    /// All badges, in authoring order.
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    /// Levels of one track, ordered by level number.
    pub fn levels_for_track(&self, track: Track) -> Vec<&Level> {
        let mut levels: Vec<&Level> = self.levels.iter().filter(|l| l.track == track).collect();
        levels.sort_by_key(|l| l.level_number);
        levels
    }

    /// The level with the given number in a track.
    pub fn level(&self, track: Track, level_number: u32) -> Option<&Level> {
        self.levels
            .iter()
            .find(|l| l.track == track && l.level_number == level_number)
    }

    /// The level with the given id.
    pub fn level_by_id(&self, level_id: &str) -> Option<&Level> {
        self.levels.iter().find(|l| l.id == level_id)
    }

    /// A lesson together with the level that owns it.
    pub fn lesson(&self, lesson_id: &str) -> Option<(&Level, &Lesson)> {
        self.levels.iter().find_map(|level| {
            level
                .lessons
                .iter()
                .find(|lesson| lesson.id == lesson_id)
                .map(|lesson| (level, lesson))
        })
    }

    /// The badge with the given id.
    pub fn badge(&self, badge_id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == badge_id)
    }

    /// Levels that would be rejected by navigation (blank title or no lessons).
    pub fn invalid_levels(&self) -> Vec<&Level> {
        self.levels.iter().filter(|l| !l.is_valid()).collect()
    }

    fn warn_invalid_levels(&self) {
        let invalid = self.invalid_levels();
        if !invalid.is_empty() {
            let ids: Vec<&str> = invalid.iter().map(|l| l.id.as_str()).collect();
            tracing::warn!(levels = ?ids, "some levels couldn't be loaded correctly");
        }
    }

    /// The reference curriculum shipped with the engine.
    pub fn builtin() -> Self {
        Self::new(builtin_levels(), builtin_badges())
    }
}

fn builtin_levels() -> Vec<Level> {
    vec![
        Level::new(
            "swift-0",
            0,
            "Swift Basics",
            "Learn the fundamentals of Swift programming",
            vec![
                Lesson::new(
                    "swift-0-variables",
                    "Your First Variable",
                    "Create and use variables",
                    "Variables hold values that can change. Declare one with `var`, \
                     a name, and an initial value: var greeting = \"Hello\"",
                )
                .with_challenge("var message = \"\"", "var message = \"Hello, World!\"")
                .with_hints([
                    "Text goes between double quotes",
                    "Put Hello, World! inside the empty quotes",
                ]),
                Lesson::new(
                    "swift-0-constants",
                    "Constants with Let",
                    "The difference between var and let",
                    "A constant cannot change once set. Use `let` instead of `var` \
                     when a value should stay fixed: let pi = 3.14159",
                )
                .with_challenge("var name = \"Swift\"", "let name = \"Swift\"")
                .with_hints(["Swap `var` for `let`"]),
                Lesson::new(
                    "swift-0-numbers",
                    "Numbers in Swift",
                    "Integers and decimals",
                    "Whole numbers are `Int`, decimals are `Double`. Arithmetic works \
                     as expected: let sum = 5 + 3",
                )
                .with_challenge("let result = 0", "let result = 10")
                .with_hints(["Replace 0 with 10", "Numbers don't need quotes"]),
            ],
            Track::Swift,
        ),
        Level::new(
            "swift-1",
            1,
            "Swift Intermediate",
            "Optionals, collections and control flow",
            vec![
                Lesson::new(
                    "swift-1-optionals",
                    "Optionals",
                    "Values that might be missing",
                    "An optional either holds a value or `nil`. Mark a type optional \
                     with `?`: var nickname: String? = nil",
                ),
                Lesson::new(
                    "swift-1-arrays",
                    "Arrays",
                    "Ordered collections",
                    "Arrays keep values in order. Write them with square brackets: \
                     let primes = [2, 3, 5]",
                )
                .with_challenge("let colors = []", "let colors = [\"red\", \"green\"]")
                .with_hints(["Each color is a String in quotes", "Separate items with commas"])
                .with_estimated_minutes(8),
            ],
            Track::Swift,
        ),
        Level::new(
            "swift-2",
            2,
            "Swift Advanced",
            "Protocols, generics and error handling",
            vec![Lesson::new(
                "swift-2-protocols",
                "Protocols",
                "Describe shared behavior",
                "A protocol lists requirements that conforming types implement: \
                 protocol Greeter { func greet() -> String }",
            )
            .with_challenge("protocol Named {}", "protocol Named { var name: String { get } }")
            .with_hints(["Declare a `name` property", "Read-only properties use `{ get }`"])
            .with_estimated_minutes(10)],
            Track::Swift,
        ),
        Level::new(
            "swiftui-0",
            0,
            "SwiftUI Basics",
            "Build your first user interfaces with SwiftUI",
            vec![Lesson::new(
                "swiftui-0-text",
                "Your First View",
                "Show text on screen",
                "Every SwiftUI screen is built from views. `Text` displays a string: \
                 Text(\"Welcome\")",
            )
            .with_challenge("var body: some View { EmptyView() }", "Text(\"Hello, SwiftUI!\")")
            .with_hints(["Replace EmptyView() with a Text view"])],
            Track::SwiftUi,
        ),
    ]
}

fn builtin_badges() -> Vec<Badge> {
    vec![
        Badge::new(
            "first-steps",
            "First Steps",
            "Complete your first lesson",
            "star.fill",
            "Complete 1 lesson",
        )
        .with_rule(BadgeRule::FirstLesson),
        Badge::new(
            "warmed-up",
            "Warmed Up",
            "Complete three lessons",
            "flame.fill",
            "Complete 3 lessons",
        )
        .with_rule(BadgeRule::CompleteLessons { count: 3 }),
        Badge::new(
            "swift-basics",
            "Basics Graduate",
            "Finish Swift Basics",
            "graduationcap.fill",
            "Complete Swift level 0",
        )
        .with_rule(BadgeRule::CompleteLevel { level_number: 0 }),
        Badge::new(
            "quick-learner",
            "Quick Learner",
            "Complete a level in one session",
            "bolt.fill",
            "Complete a level without closing the app",
        ),
        Badge::new(
            "code-master",
            "Code Master",
            "Complete all lessons in a learning path",
            "crown.fill",
            "Complete all lessons in Swift or SwiftUI",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();

        assert!(catalog.invalid_levels().is_empty());
        assert_eq!(catalog.levels_for_track(Track::Swift).len(), 3);
        assert_eq!(catalog.levels_for_track(Track::SwiftUi).len(), 1);
        assert!(!catalog.badges().is_empty());
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = Catalog::builtin();
        let mut ids: Vec<&str> = catalog
            .levels()
            .iter()
            .flat_map(|l| l.lessons.iter().map(|lesson| lesson.id.as_str()))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_interactive_builtin_lessons_carry_solutions() {
        for level in Catalog::builtin().levels() {
            for lesson in &level.lessons {
                if lesson.is_interactive() {
                    assert!(lesson.solution.is_some(), "{} has no solution", lesson.id);
                }
            }
        }
    }

    #[test]
    fn test_level_lookup_is_per_track() {
        let catalog = Catalog::builtin();

        assert_eq!(catalog.level(Track::Swift, 0).unwrap().id, "swift-0");
        assert_eq!(catalog.level(Track::SwiftUi, 0).unwrap().id, "swiftui-0");
        assert!(catalog.level(Track::SwiftUi, 1).is_none());
        assert_eq!(catalog.level_by_id("swift-2").unwrap().level_number, 2);
    }

    #[test]
    fn test_levels_for_track_sorted() {
        let catalog = Catalog::new(
            vec![
                Level::new("b", 1, "B", "", vec![], Track::Swift),
                Level::new("a", 0, "A", "", vec![], Track::Swift),
                Level::new("u", 0, "U", "", vec![], Track::SwiftUi),
            ],
            vec![],
        );

        let numbers: Vec<u32> = catalog
            .levels_for_track(Track::Swift)
            .iter()
            .map(|l| l.level_number)
            .collect();
        assert_eq!(numbers, vec![0, 1]);
    }

    #[test]
    fn test_lesson_lookup_returns_owning_level() {
        let catalog = Catalog::builtin();

        let (level, lesson) = catalog.lesson("swift-1-arrays").unwrap();
        assert_eq!(level.id, "swift-1");
        assert_eq!(lesson.title, "Arrays");
        assert!(catalog.lesson("does-not-exist").is_none());
    }

    #[test]
    fn test_invalid_levels_reported() {
        let catalog = Catalog::new(
            vec![
                Level::new("empty", 0, "Empty", "", vec![], Track::Swift),
                Level::new("ok", 1, "Ok", "", vec![Lesson::new("l", "L", "", "c")], Track::Swift),
            ],
            vec![],
        );

        let invalid = catalog.invalid_levels();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].id, "empty");
    }

    #[test]
    fn test_json_roundtrip() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let parsed = Catalog::from_json_str(&json).unwrap();
        assert_eq!(parsed, catalog);
    }

    #[test]
    fn test_from_json_rejects_unknown_rule_kind() {
        let json = r#"{
            "levels": [],
            "badges": [{
                "id": "b", "title": "B", "description": "", "icon": "i",
                "unlock_condition": "", "rule": {"kind": "weekend_warrior"}
            }]
        }"#;

        let err = Catalog::from_json_str(json).unwrap_err();
        assert!(matches!(err, StepwiseError::Content { .. }));
    }

    #[test]
    fn test_load_or_builtin_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "not json").unwrap();

        assert_eq!(Catalog::load_or_builtin(Some(&path)), Catalog::builtin());
        assert_eq!(Catalog::load_or_builtin(None), Catalog::builtin());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = Catalog::new(
            vec![Level::new(
                "only",
                0,
                "Only",
                "",
                vec![Lesson::new("l", "L", "", "c")],
                Track::Swift,
            )],
            vec![],
        );
        fs::write(&path, serde_json::to_string_pretty(&catalog).unwrap()).unwrap();

        assert_eq!(Catalog::load_from_file(&path).unwrap(), catalog);
    }
}
