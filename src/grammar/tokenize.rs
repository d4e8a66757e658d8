//! Leaf-string tokenizers used when `split_non_terminal` is on.
//!
//! Both tokenizers are concatenation-preserving: joining the pieces gives back
//! the input, which is what the evaluator does when it rebuilds a leaf.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static WORD_PIECES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w+|\s+|[^\w\s]").expect("word tokenizer regex is valid"));

/// Splits into runs of word characters, runs of whitespace, and single
/// punctuation characters.
///
/// ```rust
/// use treebeam::grammar::tokenize::split_words;
/// assert_eq!(split_words("x = y+1"), vec!["x", " ", "=", " ", "y", "+", "1"]);
/// ```
pub fn split_words(text: &str) -> Vec<String> {
    WORD_PIECES
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Splits into extended grapheme clusters.
pub fn split_graphemes(text: &str) -> Vec<String> {
    text.graphemes(true).map(str::to_string).collect()
}
