//! Record validation applied immediately before scoring
//!
//! The validator takes a complete candidate record and checks every
//! business rule independently, so a failure names every violated
//! constraint rather than the first one found. A failure is recoverable:
//! the dialogue returns to collection with the collected fields kept.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::field::{bounds, is_region, ApplicationField, Gender, MaritalStatus};
use crate::record::ApplicationRecord;

/// A single violated constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: ApplicationField,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field.display_name(), self.message)
    }
}

/// Validation failure listing every violated constraint
#[derive(Error, Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "application failed validation:")?;
        for violation in &self.violations {
            writeln!(f, "- {}", violation)?;
        }
        Ok(())
    }
}

impl ValidationError {
    /// Whether a particular field is among the violations
    pub fn names_field(&self, field: ApplicationField) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// A fully validated application with typed field access
///
/// Built only by `validate`; downstream code (scoring prompt, email body)
/// reads from this instead of poking at the raw record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedApplication {
    pub age: u8,
    pub gender: Gender,
    pub marital_status: MaritalStatus,
    pub location: String,
    pub amount: f64,
    pub tenure: u32,
}

/// Validate a complete candidate record against the business rules.
///
/// Every rule is checked; all violations are returned together.
pub fn validate(record: &ApplicationRecord) -> Result<ValidatedApplication, ValidationError> {
    let mut violations = Vec::new();

    let age = match record
        .get(ApplicationField::Age)
        .and_then(|v| v.as_i64())
    {
        Some(age) if age > bounds::AGE_EXCLUSIVE_MIN && age < bounds::AGE_EXCLUSIVE_MAX => {
            Some(age as u8)
        },
        Some(age) => {
            violations.push(FieldViolation {
                field: ApplicationField::Age,
                message: format!("must be between 19 and 99, got {}", age),
            });
            None
        },
        None => {
            violations.push(missing(ApplicationField::Age));
            None
        },
    };

    let gender = match record
        .get(ApplicationField::Gender)
        .and_then(|v| v.as_str())
    {
        Some(raw) => match Gender::from_str(raw) {
            Ok(g) => Some(g),
            Err(_) => {
                violations.push(FieldViolation {
                    field: ApplicationField::Gender,
                    message: format!("must be male, female, or other, got '{}'", raw),
                });
                None
            },
        },
        None => {
            violations.push(missing(ApplicationField::Gender));
            None
        },
    };

    let marital_status = match record
        .get(ApplicationField::MaritalStatus)
        .and_then(|v| v.as_str())
    {
        Some(raw) => match MaritalStatus::from_str(raw) {
            Ok(m) => Some(m),
            Err(_) => {
                violations.push(FieldViolation {
                    field: ApplicationField::MaritalStatus,
                    message: format!(
                        "must be single, married, divorced, or widowed, got '{}'",
                        raw
                    ),
                });
                None
            },
        },
        None => {
            violations.push(missing(ApplicationField::MaritalStatus));
            None
        },
    };

    let location = match record
        .get(ApplicationField::Location)
        .and_then(|v| v.as_str())
    {
        Some(raw) if is_region(raw) => Some(raw.to_string()),
        Some(raw) => {
            violations.push(FieldViolation {
                field: ApplicationField::Location,
                message: format!("'{}' is not a recognized state", raw),
            });
            None
        },
        None => {
            violations.push(missing(ApplicationField::Location));
            None
        },
    };

    let amount = match record
        .get(ApplicationField::Amount)
        .and_then(|v| v.as_f64())
    {
        Some(amount) if amount > 0.0 && amount <= bounds::AMOUNT_MAX => Some(amount),
        Some(amount) => {
            violations.push(FieldViolation {
                field: ApplicationField::Amount,
                message: format!("must be positive and at most 1,000,000, got {}", amount),
            });
            None
        },
        None => {
            violations.push(missing(ApplicationField::Amount));
            None
        },
    };

    let tenure = match record
        .get(ApplicationField::Tenure)
        .and_then(|v| v.as_i64())
    {
        Some(tenure) if tenure > bounds::TENURE_EXCLUSIVE_MIN && tenure <= bounds::TENURE_MAX => {
            Some(tenure as u32)
        },
        Some(tenure) => {
            violations.push(FieldViolation {
                field: ApplicationField::Tenure,
                message: format!("must be between 7 and 180 days, got {}", tenure),
            });
            None
        },
        None => {
            violations.push(missing(ApplicationField::Tenure));
            None
        },
    };

    // Every None above pushed a violation, so the tuple is fully Some
    // exactly when violations is empty.
    match (age, gender, marital_status, location, amount, tenure) {
        (Some(age), Some(gender), Some(marital_status), Some(location), Some(amount), Some(tenure))
            if violations.is_empty() =>
        {
            Ok(ValidatedApplication {
                age,
                gender,
                marital_status,
                location,
                amount,
                tenure,
            })
        },
        _ => {
            tracing::debug!(count = violations.len(), "record validation failed");
            Err(ValidationError { violations })
        },
    }
}

fn missing(field: ApplicationField) -> FieldViolation {
    FieldViolation {
        field,
        message: "missing".to_string(),
    }
}
