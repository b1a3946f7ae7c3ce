//! The layered field extractor
//!
//! For each requested field the three strategies run in strict priority
//! order, stopping at the first hit. Whatever a strategy produces is then
//! normalized and validated; a candidate that fails either step is
//! dropped for that field alone and the next turn simply retries.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use loan_agent_core::{
    normalize_and_validate, ApplicationField, ApplicationRecord, FieldValue,
};

use crate::entities::{EntityLabel, EntityRecognizer, NamedEntity};
use crate::numbers::word_to_number;
use crate::patterns::FieldPatterns;
use crate::token::{clean_text, tokenize, Token};

/// Confidence assigned by each strategy
const PATTERN_CONFIDENCE: f32 = 0.8;
const ENTITY_CONFIDENCE: f32 = 0.7;
const CONTEXT_CONFIDENCE: f32 = 0.6;

/// Token window inspected around an ambiguous entity
const ENTITY_CONTEXT_WINDOW: usize = 3;
/// Token window inspected around a keyword anchor
const KEYWORD_CONTEXT_WINDOW: usize = 5;

const GENDER_VALUES: [&str; 3] = ["male", "female", "other"];
const MARITAL_VALUES: [&str; 4] = ["single", "married", "divorced", "widowed"];

/// A normalized, validated candidate value for one field
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: FieldValue,
    pub confidence: f32,
}

/// Free-text field extractor
///
/// Holds only static configuration; extraction has no side effects and no
/// mutable cross-call state. The entity recognizer is injected at
/// construction.
pub struct FieldExtractor {
    patterns: FieldPatterns,
    recognizer: Arc<dyn EntityRecognizer>,
}

impl FieldExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            patterns: FieldPatterns::new(),
            recognizer,
        }
    }

    /// Extract the requested fields from an utterance.
    ///
    /// Fields already present in `current` are skipped, so a previously
    /// collected value can never be replaced by a lower-confidence guess.
    /// Only values that normalize and validate successfully appear in the
    /// result.
    pub fn extract(
        &self,
        text: &str,
        fields_to_extract: &BTreeSet<ApplicationField>,
        current: &ApplicationRecord,
    ) -> BTreeMap<ApplicationField, Extracted> {
        let text = clean_text(text);
        let tokens = tokenize(&text);
        let entities = self.recognizer.recognize(&tokens);

        let mut results = BTreeMap::new();

        for &field in fields_to_extract {
            if current.contains(field) {
                continue;
            }

            let candidate = self
                .extract_with_patterns(field, &text)
                .map(|raw| (raw, PATTERN_CONFIDENCE))
                .or_else(|| {
                    self.extract_with_entities(field, &tokens, &entities)
                        .map(|raw| (raw, ENTITY_CONFIDENCE))
                })
                .or_else(|| {
                    self.extract_with_context(field, &tokens)
                        .map(|raw| (raw, CONTEXT_CONFIDENCE))
                });

            let Some((raw, confidence)) = candidate else {
                continue;
            };

            match self.finalize(field, &raw) {
                Ok(value) => {
                    tracing::debug!(
                        field = field.name(),
                        value = %value,
                        confidence,
                        "field extracted"
                    );
                    results.insert(field, Extracted { value, confidence });
                },
                Err(err) => {
                    // A bad candidate for one field never blocks the others
                    tracing::trace!(field = field.name(), raw, %err, "candidate discarded");
                },
            }
        }

        results
    }

    fn extract_with_patterns(&self, field: ApplicationField, text: &str) -> Option<String> {
        self.patterns.extract(field, text)
    }

    fn extract_with_entities(
        &self,
        field: ApplicationField,
        tokens: &[Token],
        entities: &[NamedEntity],
    ) -> Option<String> {
        // Categorical enums are cheap to spot directly in the token stream
        match field {
            ApplicationField::Gender => {
                return tokens
                    .iter()
                    .find(|t| GENDER_VALUES.contains(&t.lower.as_str()))
                    .map(|t| t.lower.clone());
            },
            ApplicationField::MaritalStatus => {
                return tokens
                    .iter()
                    .find(|t| MARITAL_VALUES.contains(&t.lower.as_str()))
                    .map(|t| t.lower.clone());
            },
            _ => {},
        }

        for entity in entities {
            match entity.label {
                EntityLabel::Money if field == ApplicationField::Amount => {
                    return Some(entity.text.clone());
                },
                EntityLabel::Gpe if field == ApplicationField::Location => {
                    return Some(entity.text.clone());
                },
                // A bare number could be an age, an amount, or a tenure;
                // the surrounding tokens decide which
                EntityLabel::Cardinal if field.is_numeric() => {
                    let start = entity.start.saturating_sub(ENTITY_CONTEXT_WINDOW);
                    let end = (entity.end + ENTITY_CONTEXT_WINDOW).min(tokens.len());
                    let context = tokens[start..end]
                        .iter()
                        .map(|t| t.lower.as_str())
                        .collect::<Vec<_>>()
                        .join(" ");
                    if field_keywords(field).iter().any(|kw| context.contains(kw)) {
                        return Some(entity.text.clone());
                    }
                },
                _ => {},
            }
        }

        None
    }

    fn extract_with_context(&self, field: ApplicationField, tokens: &[Token]) -> Option<String> {
        let keywords = field_keywords(field);

        for (i, token) in tokens.iter().enumerate() {
            if token.is_stopword() || token.is_punct() {
                continue;
            }

            if keywords.iter().any(|kw| token.lower.contains(kw)) {
                let start = i.saturating_sub(KEYWORD_CONTEXT_WINDOW);
                let end = (i + KEYWORD_CONTEXT_WINDOW).min(tokens.len());
                let window = &tokens[start..end];

                if field.is_numeric() {
                    if let Some(nearby) = window.iter().find(|t| t.like_num()) {
                        return Some(nearby.text.clone());
                    }
                } else {
                    let member = window.iter().find(|t| match field {
                        ApplicationField::Gender => GENDER_VALUES.contains(&t.lower.as_str()),
                        ApplicationField::MaritalStatus => {
                            MARITAL_VALUES.contains(&t.lower.as_str())
                        },
                        ApplicationField::Location => loan_agent_core::is_region(&t.lower),
                        _ => false,
                    });
                    if let Some(found) = member {
                        return Some(found.text.clone());
                    }
                }
            }

            // "in <ProperNoun>" reads as a place even without a keyword
            if field == ApplicationField::Location
                && i > 0
                && tokens[i - 1].lower == "in"
                && token.is_propn()
            {
                return Some(token.text.clone());
            }
        }

        None
    }

    /// Word-to-number conversion, then per-field normalization/validation
    fn finalize(
        &self,
        field: ApplicationField,
        raw: &str,
    ) -> Result<FieldValue, loan_agent_core::FieldError> {
        let mut raw = raw.to_string();

        if field.is_numeric() {
            let cleaned = raw.replace(['$', '₦', ','], "");
            if cleaned.parse::<f64>().is_err() {
                if let Some(n) = word_to_number(&raw) {
                    raw = n.to_string();
                }
            }
        }

        normalize_and_validate(field, &raw)
    }
}

/// Field-associated keywords for context search and disambiguation
fn field_keywords(field: ApplicationField) -> &'static [&'static str] {
    match field {
        ApplicationField::Age => &["age", "old", "year", "years"],
        ApplicationField::Gender => {
            &["gender", "male", "female", "other", "man", "woman", "nonbinary"]
        },
        ApplicationField::MaritalStatus => {
            &["marital", "single", "married", "divorced", "widowed", "bachelor", "spouse"]
        },
        ApplicationField::Location => {
            &["location", "city", "live", "residing", "address", "from", "located", "state"]
        },
        ApplicationField::Amount => {
            &["amount", "loan", "borrow", "dollar", "naira", "money", "fund", "price", "cost"]
        },
        // "year" is deliberately absent: "30 years old" is an age, and
        // year-denominated tenures only count with a term/period anchor
        ApplicationField::Tenure => {
            &["tenure", "tenor", "month", "term", "period", "duration", "repayment"]
        },
    }
}
