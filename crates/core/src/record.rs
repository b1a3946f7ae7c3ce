//! Application record
//!
//! A map from field to scalar value. Once a field is present it is never
//! silently replaced; the only way to change it is the explicit
//! `overwrite` used by the modify flow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::field::{ApplicationField, FieldValue};

/// The structured data collected for one loan application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    fields: BTreeMap<ApplicationField, FieldValue>,
}

impl ApplicationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value
    pub fn get(&self, field: ApplicationField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    pub fn contains(&self, field: ApplicationField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Insert a value only if the field is not yet present.
    ///
    /// Returns `true` when the value was stored. A present field is left
    /// untouched so repeated extraction can never downgrade collected data.
    pub fn set(&mut self, field: ApplicationField, value: FieldValue) -> bool {
        if self.fields.contains_key(&field) {
            tracing::debug!(field = field.name(), "field already collected, keeping prior value");
            return false;
        }
        self.fields.insert(field, value);
        true
    }

    /// Replace a field value through the explicit modify flow.
    ///
    /// Returns the previous value, if any.
    pub fn overwrite(&mut self, field: ApplicationField, value: FieldValue) -> Option<FieldValue> {
        let prior = self.fields.insert(field, value);
        tracing::debug!(field = field.name(), prior = ?prior, "field overwritten via modify flow");
        prior
    }

    /// Remove a field so it gets collected again
    pub fn remove(&mut self, field: ApplicationField) -> Option<FieldValue> {
        self.fields.remove(&field)
    }

    /// Drop every field (session reset)
    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Whether all six schema fields are present
    pub fn is_complete(&self) -> bool {
        ApplicationField::ALL.iter().all(|f| self.fields.contains_key(f))
    }

    /// Iterate fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (ApplicationField, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// Serialize the record as a JSON object keyed by field name
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (field, value) in self.iter() {
            let json = match value {
                FieldValue::Int(v) => serde_json::json!(v),
                FieldValue::Float(v) => serde_json::json!(v),
                FieldValue::Text(s) => serde_json::json!(s),
            };
            map.insert(field.name().to_string(), json);
        }
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_refuses_silent_overwrite() {
        let mut record = ApplicationRecord::new();
        assert!(record.set(ApplicationField::Age, FieldValue::Int(30)));
        assert!(!record.set(ApplicationField::Age, FieldValue::Int(45)));
        assert_eq!(record.get(ApplicationField::Age), Some(&FieldValue::Int(30)));
    }

    #[test]
    fn test_overwrite_is_explicit() {
        let mut record = ApplicationRecord::new();
        record.set(ApplicationField::Age, FieldValue::Int(30));
        let prior = record.overwrite(ApplicationField::Age, FieldValue::Int(45));
        assert_eq!(prior, Some(FieldValue::Int(30)));
        assert_eq!(record.get(ApplicationField::Age), Some(&FieldValue::Int(45)));
    }

    #[test]
    fn test_completeness() {
        let mut record = ApplicationRecord::new();
        assert!(!record.is_complete());
        record.set(ApplicationField::Age, FieldValue::Int(30));
        record.set(ApplicationField::Gender, FieldValue::Text("male".into()));
        record.set(ApplicationField::MaritalStatus, FieldValue::Text("single".into()));
        record.set(ApplicationField::Location, FieldValue::Text("Lagos".into()));
        record.set(ApplicationField::Amount, FieldValue::Float(50_000.0));
        assert!(!record.is_complete());
        record.set(ApplicationField::Tenure, FieldValue::Int(60));
        assert!(record.is_complete());
    }

    #[test]
    fn test_to_json_uses_field_names() {
        let mut record = ApplicationRecord::new();
        record.set(ApplicationField::Location, FieldValue::Text("Lagos".into()));
        record.set(ApplicationField::Amount, FieldValue::Float(50_000.0));
        let json = record.to_json();
        assert_eq!(json["location"], "Lagos");
        assert_eq!(json["amount"], 50_000.0);
    }
}
