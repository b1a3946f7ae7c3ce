//! Named-entity recognition behind an injected trait
//!
//! The extractor's second strategy consumes generic entity categories and
//! maps them onto fields. The recognizer is constructed once, read-only
//! after init, and passed in as a constructor dependency so alternative
//! backends (or a no-op for tests) can be swapped without touching the
//! extractor.

use crate::token::Token;

/// Entity categories the extractor knows how to map onto fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityLabel {
    /// Monetary value with a currency marker
    Money,
    /// Bare numeric value, ambiguous between age/amount/tenure
    Cardinal,
    /// Geo-political entity (state, city)
    Gpe,
}

/// A recognized entity spanning `start..end` tokens
#[derive(Debug, Clone, PartialEq)]
pub struct NamedEntity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

/// General-purpose named-entity recognizer
pub trait EntityRecognizer: Send + Sync {
    /// Recognize entities over the tokenized utterance
    fn recognize(&self, tokens: &[Token]) -> Vec<NamedEntity>;
}

const CURRENCY_MARKERS: [&str; 7] = ["$", "₦", "dollars", "dollar", "usd", "naira", "ngn"];

/// Rule-based recognizer over a region gazetteer and numeric lexicon
///
/// Stands in for a full statistical NER model: money is a numeric span
/// next to a currency marker, cardinals are any remaining numeric spans
/// (digit or spelled-out), and geo-political entities come from the
/// configured gazetteer plus an "in <ProperNoun>" heuristic.
pub struct LexiconRecognizer {
    regions: Vec<String>,
}

impl LexiconRecognizer {
    pub fn new(regions: Vec<String>) -> Self {
        Self {
            regions: regions.into_iter().map(|r| r.to_lowercase()).collect(),
        }
    }

    fn is_region(&self, name: &str) -> bool {
        self.regions.iter().any(|r| r == name)
    }

    fn has_currency_marker(&self, tokens: &[Token], start: usize, end: usize) -> bool {
        let before = start.checked_sub(1).map(|i| &tokens[i]);
        let after = tokens.get(end);
        [before, after]
            .into_iter()
            .flatten()
            .any(|t| CURRENCY_MARKERS.contains(&t.lower.as_str()))
    }
}

impl EntityRecognizer for LexiconRecognizer {
    fn recognize(&self, tokens: &[Token]) -> Vec<NamedEntity> {
        let mut entities = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            // Numeric spans: merge adjacent number tokens ("twenty five")
            if tokens[i].like_num() {
                let start = i;
                while i < tokens.len() && tokens[i].like_num() {
                    i += 1;
                }
                let text = tokens[start..i]
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                let label = if self.has_currency_marker(tokens, start, i) {
                    EntityLabel::Money
                } else {
                    EntityLabel::Cardinal
                };
                entities.push(NamedEntity {
                    text,
                    label,
                    start,
                    end: i,
                });
                continue;
            }

            // Gazetteer regions, two-word names first ("akwa ibom")
            if i + 1 < tokens.len() {
                let bigram = format!("{} {}", tokens[i].lower, tokens[i + 1].lower);
                if self.is_region(&bigram) {
                    entities.push(NamedEntity {
                        text: format!("{} {}", tokens[i].text, tokens[i + 1].text),
                        label: EntityLabel::Gpe,
                        start: i,
                        end: i + 2,
                    });
                    i += 2;
                    continue;
                }
            }
            if self.is_region(&tokens[i].lower) {
                entities.push(NamedEntity {
                    text: tokens[i].text.clone(),
                    label: EntityLabel::Gpe,
                    start: i,
                    end: i + 1,
                });
                i += 1;
                continue;
            }

            // "in <ProperNoun>" reads as a place even off-gazetteer
            if tokens[i].is_propn() && i > 0 && tokens[i - 1].lower == "in" {
                entities.push(NamedEntity {
                    text: tokens[i].text.clone(),
                    label: EntityLabel::Gpe,
                    start: i,
                    end: i + 1,
                });
            }

            i += 1;
        }

        entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use loan_agent_core::NIGERIAN_STATES;

    fn recognizer() -> LexiconRecognizer {
        LexiconRecognizer::new(NIGERIAN_STATES.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_money_needs_currency_marker() {
        let tokens = tokenize("I want $50,000 for the farm");
        let entities = recognizer().recognize(&tokens);
        let money: Vec<_> = entities
            .iter()
            .filter(|e| e.label == EntityLabel::Money)
            .collect();
        assert_eq!(money.len(), 1);
        assert_eq!(money[0].text, "50,000");
    }

    #[test]
    fn test_bare_number_is_cardinal() {
        let tokens = tokenize("I am 30 years old");
        let entities = recognizer().recognize(&tokens);
        assert!(entities
            .iter()
            .any(|e| e.label == EntityLabel::Cardinal && e.text == "30"));
    }

    #[test]
    fn test_number_words_merge_into_one_span() {
        let tokens = tokenize("around twenty five days");
        let entities = recognizer().recognize(&tokens);
        assert!(entities
            .iter()
            .any(|e| e.label == EntityLabel::Cardinal && e.text == "twenty five"));
    }

    #[test]
    fn test_gazetteer_regions() {
        let tokens = tokenize("Kaduna is home for me");
        let entities = recognizer().recognize(&tokens);
        assert!(entities
            .iter()
            .any(|e| e.label == EntityLabel::Gpe && e.text == "Kaduna"));

        let tokens = tokenize("we moved to akwa ibom last year");
        let entities = recognizer().recognize(&tokens);
        assert!(entities
            .iter()
            .any(|e| e.label == EntityLabel::Gpe && e.text == "akwa ibom"));
    }

    #[test]
    fn test_in_proper_noun_heuristic() {
        let tokens = tokenize("I work in Ibadan these days");
        let entities = recognizer().recognize(&tokens);
        assert!(entities
            .iter()
            .any(|e| e.label == EntityLabel::Gpe && e.text == "Ibadan"));
    }
}
