//! Lightweight tokenization for the entity and context strategies

use unicode_segmentation::UnicodeSegmentation;

use crate::numbers::is_number_word;

/// Stopwords skipped as anchor tokens by the context strategy
const STOPWORDS: [&str; 38] = [
    "a", "an", "the", "i", "me", "my", "we", "our", "you", "your", "he", "she", "it", "they",
    "is", "am", "are", "was", "be", "been", "have", "has", "do", "does", "will", "would", "and",
    "or", "but", "of", "to", "for", "with", "at", "on", "so", "that", "this",
];

/// One token of the cleaned utterance
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Original text
    pub text: String,
    /// Lowercased text
    pub lower: String,
}

impl Token {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            lower: text.to_lowercase(),
        }
    }

    /// Whether the token reads as a number: digits (commas allowed) or a
    /// spelled-out number word ("thirty")
    pub fn like_num(&self) -> bool {
        let stripped = self.lower.replace(',', "");
        if !stripped.is_empty() && stripped.parse::<f64>().is_ok() {
            return true;
        }
        is_number_word(&self.lower)
    }

    pub fn is_stopword(&self) -> bool {
        STOPWORDS.contains(&self.lower.as_str())
    }

    /// Whether the token is punctuation or a symbol
    pub fn is_punct(&self) -> bool {
        !self.text.chars().any(|c| c.is_alphanumeric())
    }

    /// Proper-noun heuristic: leading uppercase, rest lowercase
    pub fn is_propn(&self) -> bool {
        let mut chars = self.text.chars();
        match chars.next() {
            Some(first) => first.is_uppercase() && chars.all(|c| c.is_lowercase()),
            None => false,
        }
    }
}

/// Split text into tokens, keeping symbol tokens like `$` so currency
/// markers stay visible to the entity recognizer
pub fn tokenize(text: &str) -> Vec<Token> {
    text.split_word_bounds()
        .filter(|s| !s.trim().is_empty())
        .map(Token::new)
        .collect()
}

/// Collapse runs of whitespace; applied before any extraction
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
