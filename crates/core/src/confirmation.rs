//! Yes/no classification for the manipulation confirmation question.

use serde::Serialize;

const AFFIRMATIVE_TOKENS: [&str; 4] = ["yes", "yeah", "positive", "yep"];
const NEGATIVE_TOKENS: [&str; 2] = ["no", "nope"];

/// How a participant answered the confirmation question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confirmation {
    Affirmative,
    Negative,
    Ambiguous,
}

/// Classifies an utterance by exact token first, then by substring.
///
/// The affirmative check always runs before the negative one, so an answer
/// containing both ("yes, no") is affirmative. Substring matching is
/// deliberately loose: "not sure" counts as negative.
pub fn classify(utterance: &str) -> Confirmation {
    let normalized = normalize(utterance);

    if AFFIRMATIVE_TOKENS.contains(&normalized.as_str()) || normalized.contains("yes") {
        Confirmation::Affirmative
    } else if NEGATIVE_TOKENS.contains(&normalized.as_str()) || normalized.contains("no") {
        Confirmation::Negative
    } else {
        Confirmation::Ambiguous
    }
}

// Recognizers attach punctuation ("Yeah!"), which would defeat the exact token match.
fn normalize(utterance: &str) -> String {
    utterance
        .trim()
        .to_lowercase()
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_answers() {
        for answer in ["yes", "Yeah!", "I think yes", "  YEP ", "positive", "yes please"] {
            assert_eq!(classify(answer), Confirmation::Affirmative, "{answer}");
        }
    }

    #[test]
    fn test_negative_answers() {
        for answer in ["no", "nope", "No.", "I am not sure", "I don't know"] {
            assert_eq!(classify(answer), Confirmation::Negative, "{answer}");
        }
    }

    #[test]
    fn test_ambiguous_answers() {
        for answer in ["maybe", "", "what?", "the pilot"] {
            assert_eq!(classify(answer), Confirmation::Ambiguous, "{answer}");
        }
    }

    #[test]
    fn test_both_tokens_resolve_to_affirmative() {
        assert_eq!(classify("yes, no"), Confirmation::Affirmative);
        assert_eq!(classify("no... yes"), Confirmation::Affirmative);
    }
}
