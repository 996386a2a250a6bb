//! Keyword post-filter for model answers

/// Returned when no answer sentence mentions a question keyword
pub const FALLBACK_ANSWER: &str = "Sorry, I couldn't find a relevant answer.";

/// Keep the sentences of `answer` that mention a word of `question`
///
/// The answer is split on `.`; a sentence is kept when any lower-cased,
/// whitespace-separated question word occurs as a substring of the
/// lower-cased sentence. Kept sentences are trimmed and joined with `". "`,
/// ending in a period. With nothing kept the result is [`FALLBACK_ANSWER`].
pub fn keyword_filter(answer: &str, question: &str) -> String {
    let question = question.to_lowercase();
    let keywords: Vec<&str> = question.split_whitespace().collect();

    let kept: Vec<&str> = answer
        .split('.')
        .filter(|sentence| {
            let lowered = sentence.to_lowercase();
            keywords.iter().any(|k| lowered.contains(k))
        })
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect();

    if kept.is_empty() {
        return FALLBACK_ANSWER.to_string();
    }

    let mut filtered = kept.join(". ");
    filtered.push('.');
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_matching_sentence() {
        assert_eq!(
            keyword_filter("Python is great. Go is fast.", "python speed"),
            "Python is great."
        );
    }

    #[test]
    fn test_no_match_gives_fallback() {
        assert_eq!(keyword_filter("Cats are cute.", "rust performance"), FALLBACK_ANSWER);
    }

    #[test]
    fn test_multiple_sentences_joined() {
        assert_eq!(
            keyword_filter(
                "Rust has no GC. Cats nap. Rust compiles to native code.",
                "Rust"
            ),
            "Rust has no GC. Rust compiles to native code."
        );
    }

    #[test]
    fn test_trailing_fragments_never_appear() {
        let filtered = keyword_filter("Rust is safe...  ", "rust");
        assert_eq!(filtered, "Rust is safe.");
        assert!(!filtered.ends_with(". ."));
        assert!(!filtered.contains(".."));
    }

    #[test]
    fn test_substring_match() {
        // "fast" is contained in "breakfast"
        assert_eq!(keyword_filter("Breakfast is served.", "fast"), "Breakfast is served.");
    }

    #[test]
    fn test_empty_question_gives_fallback() {
        assert_eq!(keyword_filter("Anything at all.", ""), FALLBACK_ANSWER);
        assert_eq!(keyword_filter("Anything at all.", "   "), FALLBACK_ANSWER);
    }

    #[test]
    fn test_empty_answer_gives_fallback() {
        assert_eq!(keyword_filter("", "rust"), FALLBACK_ANSWER);
    }

    #[test]
    fn test_answer_without_period() {
        assert_eq!(keyword_filter("Rust is memory safe", "memory"), "Rust is memory safe.");
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let once = keyword_filter("Tokio runs tasks. Cats nap. Tokio is async.", "tokio");
        assert_eq!(keyword_filter(&once, "tokio"), once);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(keyword_filter("SERDE derives traits.", "Serde"), "SERDE derives traits.");
    }
}
