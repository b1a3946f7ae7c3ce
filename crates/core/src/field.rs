//! Application field schema
//!
//! The six collected fields form a closed enumeration. Per-field
//! normalization and validation is a match over this enum rather than a
//! table of closures, so the compiler checks that every field is handled.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FieldError;

/// The closed set of fields collected for a loan application
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationField {
    Age,
    Gender,
    MaritalStatus,
    Location,
    Amount,
    Tenure,
}

impl ApplicationField {
    /// All six fields, in schema order
    pub const ALL: [ApplicationField; 6] = [
        ApplicationField::Age,
        ApplicationField::Gender,
        ApplicationField::MaritalStatus,
        ApplicationField::Location,
        ApplicationField::Amount,
        ApplicationField::Tenure,
    ];

    /// Machine-readable field name
    pub fn name(&self) -> &'static str {
        match self {
            ApplicationField::Age => "age",
            ApplicationField::Gender => "gender",
            ApplicationField::MaritalStatus => "marital_status",
            ApplicationField::Location => "location",
            ApplicationField::Amount => "amount",
            ApplicationField::Tenure => "tenure",
        }
    }

    /// Human-readable field name for progress summaries
    pub fn display_name(&self) -> &'static str {
        match self {
            ApplicationField::Age => "Age",
            ApplicationField::Gender => "Gender",
            ApplicationField::MaritalStatus => "Marital Status",
            ApplicationField::Location => "Location",
            ApplicationField::Amount => "Loan Amount",
            ApplicationField::Tenure => "Loan Tenure (days)",
        }
    }

    /// Look up a field by its machine-readable name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.name() == name)
    }

    /// Whether the field carries a numeric value
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ApplicationField::Age | ApplicationField::Amount | ApplicationField::Tenure
        )
    }
}

impl fmt::Display for ApplicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            FieldValue::Float(v) => Some(*v as i64),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            FieldValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

/// Gender of the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            _ => Err(()),
        }
    }
}

/// Marital status of the applicant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "single",
            MaritalStatus::Married => "married",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::Widowed => "widowed",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" => Ok(MaritalStatus::Single),
            "married" => Ok(MaritalStatus::Married),
            "divorced" => Ok(MaritalStatus::Divorced),
            "widowed" => Ok(MaritalStatus::Widowed),
            _ => Err(()),
        }
    }
}

/// The 36 Nigerian states plus the Federal Capital Territory
pub const NIGERIAN_STATES: [&str; 37] = [
    "abia",
    "adamawa",
    "akwa ibom",
    "anambra",
    "bauchi",
    "bayelsa",
    "benue",
    "borno",
    "cross river",
    "delta",
    "ebonyi",
    "edo",
    "ekiti",
    "enugu",
    "gombe",
    "imo",
    "jigawa",
    "kaduna",
    "kano",
    "katsina",
    "kebbi",
    "kogi",
    "kwara",
    "lagos",
    "nasarawa",
    "niger",
    "ogun",
    "ondo",
    "osun",
    "oyo",
    "plateau",
    "rivers",
    "sokoto",
    "taraba",
    "yobe",
    "zamfara",
    "fct",
];

/// Check membership in the fixed region enumeration (case-insensitive)
pub fn is_region(name: &str) -> bool {
    let lower = name.trim().to_lowercase();
    NIGERIAN_STATES.contains(&lower.as_str())
}

/// Title-case each word of a location ("akwa ibom" -> "Akwa Ibom")
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extraction-facing bounds
///
/// These are the bounds applied to candidate values as they come out of
/// free text. The record validator applied before scoring uses the
/// stricter business bounds (see `validator`).
pub mod bounds {
    /// Age must be strictly between these during extraction
    pub const AGE_EXCLUSIVE_MIN: i64 = 18;
    pub const AGE_EXCLUSIVE_MAX: i64 = 100;

    /// Amount must be positive and at most this
    pub const AMOUNT_MAX: f64 = 1_000_000.0;

    /// Tenure accepted at extraction time (days)
    pub const EXTRACT_TENURE_MAX: i64 = 120;

    /// Tenure accepted by the record validator (days)
    pub const TENURE_EXCLUSIVE_MIN: i64 = 6;
    pub const TENURE_MAX: i64 = 180;
}

/// Normalize a raw extracted string and validate it against the
/// extraction-facing rules for the field.
///
/// Returns the typed value only when both steps succeed; callers treat a
/// failure as a miss for this field alone.
pub fn normalize_and_validate(field: ApplicationField, raw: &str) -> Result<FieldValue, FieldError> {
    let raw = raw.trim();

    match field {
        ApplicationField::Age => {
            let age: i64 = parse_int(field, raw)?;
            if age > bounds::AGE_EXCLUSIVE_MIN && age < bounds::AGE_EXCLUSIVE_MAX {
                Ok(FieldValue::Int(age))
            } else {
                Err(FieldError::OutOfRange {
                    field,
                    message: format!("age {} must be between 19 and 99", age),
                })
            }
        },
        ApplicationField::Gender => Gender::from_str(raw)
            .map(|g| FieldValue::Text(g.as_str().to_string()))
            .map_err(|_| FieldError::UnknownValue {
                field,
                raw: raw.to_string(),
            }),
        ApplicationField::MaritalStatus => MaritalStatus::from_str(raw)
            .map(|m| FieldValue::Text(m.as_str().to_string()))
            .map_err(|_| FieldError::UnknownValue {
                field,
                raw: raw.to_string(),
            }),
        ApplicationField::Location => {
            if is_region(raw) {
                Ok(FieldValue::Text(title_case(raw)))
            } else {
                Err(FieldError::UnknownValue {
                    field,
                    raw: raw.to_string(),
                })
            }
        },
        ApplicationField::Amount => {
            let cleaned = raw.replace(['$', '₦', ','], "");
            let amount: f64 = cleaned.trim().parse().map_err(|_| FieldError::Parse {
                field,
                raw: raw.to_string(),
            })?;
            if amount > 0.0 && amount <= bounds::AMOUNT_MAX {
                Ok(FieldValue::Float(amount))
            } else {
                Err(FieldError::OutOfRange {
                    field,
                    message: format!("amount {} must be positive and at most 1,000,000", amount),
                })
            }
        },
        ApplicationField::Tenure => {
            let tenure: i64 = parse_int(field, raw)?;
            if tenure > 0 && tenure <= bounds::EXTRACT_TENURE_MAX {
                Ok(FieldValue::Int(tenure))
            } else {
                Err(FieldError::OutOfRange {
                    field,
                    message: format!("tenure {} days is outside the accepted range", tenure),
                })
            }
        },
    }
}

fn parse_int(field: ApplicationField, raw: &str) -> Result<i64, FieldError> {
    // Accept "30" as well as "30.0" coming from loose numeric captures
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    raw.parse::<f64>()
        .map(|v| v as i64)
        .map_err(|_| FieldError::Parse {
            field,
            raw: raw.to_string(),
        })
}
