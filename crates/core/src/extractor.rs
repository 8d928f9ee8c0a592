//! Decision Extractor
//!
//! Pulls the decision subject out of a participant's "I want X to jump"
//! statement.

use regex::Regex;
use std::sync::LazyLock;

static DECISION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bi want (?:the )?(.+?) to jump\b").expect("decision pattern is a valid regex")
});

/// Returns the decision subject named in `utterance`, lower-cased and trimmed.
///
/// Only the first occurrence of the statement is considered. `None` means the
/// utterance holds no decision, which is the common case and not an error.
pub fn extract_decision(utterance: &str) -> Option<String> {
    let normalized = utterance.trim().to_lowercase();
    DECISION_PATTERN
        .captures(&normalized)
        .and_then(|caps| caps.get(1))
        .map(|subject| subject.as_str().trim().to_string())
        .filter(|subject| !subject.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_subject_with_article() {
        assert_eq!(
            extract_decision("I want the Teacher to jump"),
            Some("teacher".to_string())
        );
    }

    #[test]
    fn test_extracts_subject_without_article() {
        assert_eq!(
            extract_decision("i want pilot to jump"),
            Some("pilot".to_string())
        );
    }

    #[test]
    fn test_is_case_insensitive_and_trims() {
        assert_eq!(
            extract_decision("   I WANT THE Old Doctor TO JUMP  "),
            Some("old doctor".to_string())
        );
    }

    #[test]
    fn test_subject_is_shortest_span() {
        assert_eq!(
            extract_decision("I want the pilot to jump, not the boy to jump"),
            Some("pilot".to_string())
        );
    }

    #[test]
    fn test_first_of_several_statements_wins() {
        assert_eq!(
            extract_decision("I want the pilot to jump. Actually I want the teacher to jump"),
            Some("pilot".to_string())
        );
    }

    #[test]
    fn test_embedded_in_longer_sentence() {
        assert_eq!(
            extract_decision("Well, after thinking about it I want the nurse to jump."),
            Some("nurse".to_string())
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_decision("I think the pilot should stay"), None);
        assert_eq!(extract_decision("I want to jump"), None);
        assert_eq!(extract_decision(""), None);
    }

    #[test]
    fn test_requires_word_boundaries() {
        assert_eq!(extract_decision("hi want the pilot to jump"), None);
        assert_eq!(extract_decision("I want the pilot to jumpstart it"), None);
    }
}
