//! Per-field regex pattern lists for the highest-confidence strategy
//!
//! Ordered per field; the first matching capture group wins. Patterns
//! encode the phrasings applicants actually use ("I'm 30 years old",
//! "$50,000", "60 days"). Tenure phrased in months or years carries a
//! multiplier so the captured number lands in days.

use regex::Regex;

use loan_agent_core::ApplicationField;

/// One compiled pattern, with an optional day multiplier for tenure
pub struct PatternSpec {
    regex: Regex,
    multiplier: Option<i64>,
}

impl PatternSpec {
    fn plain(pattern: &str) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            multiplier: None,
        }
    }

    fn days(pattern: &str, per_unit: i64) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            multiplier: Some(per_unit),
        }
    }
}

/// Compiled pattern lists for all six fields
pub struct FieldPatterns {
    age: Vec<PatternSpec>,
    gender: Vec<PatternSpec>,
    marital_status: Vec<PatternSpec>,
    location: Vec<PatternSpec>,
    amount: Vec<PatternSpec>,
    tenure: Vec<PatternSpec>,
}

impl FieldPatterns {
    pub fn new() -> Self {
        Self {
            age: vec![
                PatternSpec::plain(r"(?i)\b(?:i am|i'm|my age is|aged?)\s*(\d{1,2})\b"),
                PatternSpec::plain(r"(?i)\b(\d{1,2})\s*(?:years old|year old|years|year)\b"),
            ],
            gender: vec![
                PatternSpec::plain(
                    r"(?i)\b(?:i am|i'm|my gender is|gender:?)\s*(male|female|other)\b",
                ),
                PatternSpec::plain(r"(?i)\b(male|female|other)\b"),
            ],
            marital_status: vec![
                PatternSpec::plain(
                    r"(?i)\b(?:i am|i'm|my status is|marital status:?)\s*(single|married|divorced|widowed)\b",
                ),
                PatternSpec::plain(r"(?i)\b(single|married|divorced|widowed)\b"),
            ],
            location: vec![
                PatternSpec::plain(
                    r"(?i)\b(?:i live in|i am from|i'm from|i reside in|located in|city:?)\s+([a-z]+(?:\s[a-z]+)?)",
                ),
                PatternSpec::plain(r"(?i)\bin\s+([a-z]+(?:\s[a-z]+)?)"),
            ],
            amount: vec![
                PatternSpec::plain(r"[$₦]\s*([\d,]+(?:\.\d+)?)"),
                PatternSpec::plain(r"(?i)\b([\d,]+(?:\.\d+)?)\s*(?:dollars|usd|naira|ngn)\b"),
                PatternSpec::plain(
                    r"(?i)(?:loan|borrow|amount)(?:\s+of)?\s*[$₦]?\s*([\d,]+(?:\.\d+)?)\b",
                ),
                PatternSpec::plain(
                    r"(?i)(?:loan|borrow|amount)(?:\s+of)?\s*([\d,]+(?:\.\d+)?)\s*(?:dollars|usd|naira|ngn)\b",
                ),
            ],
            tenure: vec![
                PatternSpec::days(r"(?i)\b(\d+)\s*(?:day|days)\b", 1),
                PatternSpec::days(r"(?i)\b(\d+)\s*(?:month|months)\b", 30),
                PatternSpec::days(r"(?i)\b(\d+)\s*(?:year|years)\b", 365),
                PatternSpec::days(r"(?i)(?:term|tenure|period)(?:\s+of)?\s*(\d+)\s*(?:day|days)\b", 1),
                PatternSpec::days(
                    r"(?i)(?:term|tenure|period)(?:\s+of)?\s*(\d+)\s*(?:month|months)\b",
                    30,
                ),
                PatternSpec::days(
                    r"(?i)(?:term|tenure|period)(?:\s+of)?\s*(\d+)\s*(?:year|years)\b",
                    365,
                ),
            ],
        }
    }

    fn for_field(&self, field: ApplicationField) -> &[PatternSpec] {
        match field {
            ApplicationField::Age => &self.age,
            ApplicationField::Gender => &self.gender,
            ApplicationField::MaritalStatus => &self.marital_status,
            ApplicationField::Location => &self.location,
            ApplicationField::Amount => &self.amount,
            ApplicationField::Tenure => &self.tenure,
        }
    }

    /// First matching capture group for the field, if any.
    ///
    /// Multiplied patterns (tenure in months/years) return the converted
    /// day count as the raw string.
    pub fn extract(&self, field: ApplicationField, text: &str) -> Option<String> {
        for spec in self.for_field(field) {
            if let Some(caps) = spec.regex.captures(text) {
                if let Some(m) = caps.get(1) {
                    let raw = m.as_str().trim();
                    match spec.multiplier {
                        Some(per_unit) => {
                            if let Ok(n) = raw.parse::<i64>() {
                                return Some((n * per_unit).to_string());
                            }
                        },
                        None => return Some(raw.to_string()),
                    }
                }
            }
        }
        None
    }
}

impl Default for FieldPatterns {
    fn default() -> Self {
        Self::new()
    }
}
