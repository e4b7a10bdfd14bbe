//! Text processing helpers shared by the content analyzers.
//!
//! Tokenization here is deliberately simple: lowercase alphabetic words and
//! punctuation-based sentence splitting. The analyzers that need more
//! signal get it from the lexicons and the reference tables, not from a
//! heavier parser.

pub mod embedding;
pub mod frequency;
pub mod lexicon;
pub mod phoneme;

use once_cell::sync::Lazy;
use regex::Regex;

static PAUSE_MARKER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[\d.]+ second pause\]").unwrap());
static FILLER_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(um|uh|ah|er|hmm)\b").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove `[d.d second pause]` markers from annotated text.
pub fn strip_pause_markers(text: &str) -> String {
    let stripped = PAUSE_MARKER_RE.replace_all(text, "");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}

/// Lowercase, strip pause markers and hesitation fillers; used before
/// semantic comparison so literal fillers do not dilute similarity.
pub fn preprocess_for_similarity(text: &str) -> String {
    let no_pauses = strip_pause_markers(text).to_lowercase();
    let no_fillers = FILLER_STRIP_RE.replace_all(&no_pauses, "");
    WHITESPACE_RE
        .replace_all(no_fillers.trim(), " ")
        .into_owned()
}

/// Strip punctuation from one token and lowercase it.
pub fn clean_word(word: &str) -> String {
    word.trim()
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
        .to_lowercase()
}

/// Lowercase alphabetic tokens of the text, punctuation removed.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(clean_word)
        .filter(|w| !w.is_empty() && w.chars().any(|c| c.is_alphabetic()))
        .collect()
}

/// Sentence segmentation on terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Mean token count per sentence.
pub fn avg_sentence_length(sentences: &[String]) -> f64 {
    if sentences.is_empty() {
        return 0.0;
    }
    let total: usize = sentences.iter().map(|s| tokenize_words(s).len()).sum();
    total as f64 / sentences.len() as f64
}

/// True when the text contains any of the given keywords or phrases.
/// Single-word keys match on token boundaries; phrases match as substrings
/// of the lowercased text.
pub fn contains_any(text_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| contains_keyword(text_lower, k))
}

/// Boundary-aware containment check for one keyword or phrase.
pub fn contains_keyword(text_lower: &str, keyword: &str) -> bool {
    if keyword.contains(' ') {
        return text_lower.contains(keyword);
    }
    text_lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .any(|token| token == keyword)
}

/// Count keyword occurrences over tokenized words (single-word keys) and
/// substring scans (phrases).
pub fn count_occurrences(text_lower: &str, keywords: &[&str]) -> usize {
    let tokens: Vec<&str> = text_lower
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .collect();
    let mut count = 0;
    for keyword in keywords {
        if keyword.contains(' ') {
            count += text_lower.matches(keyword).count();
        } else {
            count += tokens.iter().filter(|t| *t == keyword).count();
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_pause_markers() {
        let text = "hello [1.4 second pause] world";
        assert_eq!(strip_pause_markers(text), "hello world");
    }

    #[test]
    fn test_clean_word() {
        assert_eq!(clean_word("Hello,"), "hello");
        assert_eq!(clean_word("\"quoted!\""), "quoted");
        assert_eq!(clean_word("don't"), "don't");
    }

    #[test]
    fn test_tokenize_skips_numbers_only_tokens() {
        let tokens = tokenize_words("We sold 42 units, remarkable units!");
        assert_eq!(tokens, vec!["we", "sold", "units", "remarkable", "units"]);
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("First one. Second one! Third? ");
        assert_eq!(sentences.len(), 3);
    }

    #[test]
    fn test_contains_keyword_boundary() {
        assert!(contains_keyword("i like cats", "like"));
        assert!(!contains_keyword("unlikely story", "like"));
        assert!(contains_keyword("as you know it", "you know"));
    }

    #[test]
    fn test_count_occurrences() {
        let count = count_occurrences("so i said so, you know, so", &["so", "you know"]);
        assert_eq!(count, 4);
    }

    #[test]
    fn test_preprocess_for_similarity() {
        let text = "Um the [2.0 second pause] economy, uh, grows";
        assert_eq!(preprocess_for_similarity(text), "the economy, , grows");
    }
}
