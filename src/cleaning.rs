//! Transcript cleaning.
//!
//! Auto-generated captions carry control characters and bracketed sound
//! annotations (`[music]`, `[Laughing]`, ...). Cleaning is a fixed, ordered
//! list of literal substitutions. It is not a parser: annotations that are
//! not on the list survive, except for their closing `]`, which one of the
//! rules strips everywhere.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

/// A literal `pattern -> replacement` substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleaningRule {
    pub pattern: Cow<'static, str>,
    pub replacement: Cow<'static, str>,
}

impl CleaningRule {
    /// A rule that deletes every occurrence of `pattern`.
    pub const fn remove(pattern: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            replacement: Cow::Borrowed(""),
        }
    }

    /// A rule that replaces every occurrence of `pattern`.
    pub const fn replace(pattern: &'static str, replacement: &'static str) -> Self {
        Self {
            pattern: Cow::Borrowed(pattern),
            replacement: Cow::Borrowed(replacement),
        }
    }

    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.pattern.is_empty() || !text.contains(self.pattern.as_ref()) {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(text.replace(self.pattern.as_ref(), &self.replacement))
        }
    }
}

/// Rules for YouTube caption text, in application order.
pub const TRANSCRIPT_RULES: &[CleaningRule] = &[
    CleaningRule::replace("\n", " "),
    CleaningRule::remove("\u{a0}"),
    CleaningRule::remove("\u{feff}"),
    CleaningRule::replace("  ", " "),
    CleaningRule::remove("[music fades out]"),
    CleaningRule::remove("[Music, laughing]"),
    CleaningRule::remove("[Music]"),
    CleaningRule::remove("[synth music]"),
    CleaningRule::remove("[Loud, electronic music]"),
    CleaningRule::remove("[pause]"),
    CleaningRule::remove("[music]"),
    CleaningRule::remove("[swish]"),
    CleaningRule::remove("[ping pong sfx]"),
    CleaningRule::remove("[pop, pop]"),
    CleaningRule::remove("[pops]"),
    CleaningRule::remove("[Laughing]"),
    CleaningRule::remove("[Typing sounds]"),
    CleaningRule::remove("[num]"),
    CleaningRule::remove("[Title: "),
    CleaningRule::remove("[title: "),
    CleaningRule::remove("]"),
    CleaningRule::remove("[Closed captioning: "),
    CleaningRule::replace("  ", " "),
    CleaningRule::remove("[APPLAUSE "),
    CleaningRule::remove("[MUSIC PLAYING "),
    CleaningRule::remove("[LAUGHTER "),
    CleaningRule::remove("[CHEERS "),
    CleaningRule::remove("[SCREAMS. "),
    CleaningRule::remove("[SNORE, "),
    CleaningRule::remove("[SLAMS TABLE "),
];

/// Applies an ordered rule list to text.
#[derive(Debug, Clone)]
pub struct Cleaner {
    rules: Vec<CleaningRule>,
}

impl Cleaner {
    /// Create a cleaner from an explicit rule list.
    pub fn new(rules: Vec<CleaningRule>) -> Self {
        Self { rules }
    }

    /// The cleaner used for video transcripts.
    pub fn transcript() -> Self {
        Self::new(TRANSCRIPT_RULES.to_vec())
    }

    /// The rules, in application order.
    pub fn rules(&self) -> &[CleaningRule] {
        &self.rules
    }

    /// Clean `text`.
    ///
    /// The rule list is applied in order, then whitespace runs are collapsed
    /// and the ends trimmed. A removal can splice a new match together
    /// (`"[mu[music]sic]"`), so passes repeat until nothing changes. The
    /// result never contains a rule pattern.
    pub fn clean(&self, text: &str) -> String {
        let mut current = text.to_string();
        let mut passes = 0;

        loop {
            passes += 1;
            let mut next = current.clone();
            for rule in &self.rules {
                if let Cow::Owned(replaced) = rule.apply(&next) {
                    next = replaced;
                }
            }
            let next = collapse_whitespace(&next);

            if next == current {
                break;
            }
            current = next;
        }

        debug!(passes, before = text.len(), after = current.len(), "Cleaned text");
        current
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::transcript()
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_music_and_laughing() {
        let cleaner = Cleaner::transcript();
        assert_eq!(cleaner.clean("[music] Hello [Laughing] world"), "Hello world");
    }

    #[test]
    fn test_control_characters() {
        let cleaner = Cleaner::transcript();
        assert_eq!(
            cleaner.clean("\u{feff}An\u{a0}algorithm\nis  a   list\n\nof steps"),
            "Analgorithm is a list of steps"
        );
    }

    #[test]
    fn test_title_annotations_keep_their_text() {
        let cleaner = Cleaner::transcript();
        assert_eq!(
            cleaner.clean("[Title: Binary Numbers] Let's count [pops] in binary"),
            "Binary Numbers Let's count in binary"
        );
        assert_eq!(
            cleaner.clean("[APPLAUSE ] thank you [CHEERS ]"),
            "thank you"
        );
    }

    #[test]
    fn test_unknown_annotation_survives_apart_from_bracket() {
        let cleaner = Cleaner::transcript();
        // Only the closing bracket is covered by the rules
        assert_eq!(cleaner.clean("so [whistles] anyway"), "so [whistles anyway");
    }

    #[test]
    fn test_no_denylisted_substring_remains() {
        let cleaner = Cleaner::transcript();
        let samples = [
            "[mu[music]sic] nested",
            "[Music][Music]] double",
            "[APPLAUSE\t\n] spaced out",
            "[Typing sounds]\u{a0}[num] [Title:  Lists]",
            "[SLAMS TABLE [SNORE, [SCREAMS.  loud",
            "\u{feff}[Closed captioning: Welcome]  [synth music]",
            "[[pause]pause]",
        ];

        for sample in samples {
            let cleaned = cleaner.clean(sample);
            for rule in cleaner.rules() {
                assert!(
                    !cleaned.contains(rule.pattern.as_ref()),
                    "{:?} left {:?} in {:?}",
                    sample,
                    rule.pattern,
                    cleaned
                );
            }
        }
    }

    #[test]
    fn test_custom_rules_apply_in_order() {
        let cleaner = Cleaner::new(vec![
            CleaningRule::replace("ab", "b"),
            CleaningRule::replace("b", "c"),
        ]);
        assert_eq!(cleaner.clean("abab"), "cc");

        let reversed = Cleaner::new(vec![
            CleaningRule::replace("b", "c"),
            CleaningRule::replace("ab", "b"),
        ]);
        assert_eq!(reversed.clean("abab"), "acac");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let cleaner = Cleaner::transcript();
        let once = cleaner.clean("[music]  Loops repeat [pause] code\n[Laughing]");
        assert_eq!(cleaner.clean(&once), once);
    }
}
