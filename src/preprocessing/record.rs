//! Validated student records
//!
//! Untyped inputs (JSON objects, CSV rows) are converted into a
//! [`StudentRecord`] at the boundary, so the encoder and everything behind it
//! only ever sees a fixed schema.

use crate::error::{PlacementError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of a raw input field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Enumerated string label, encoded through a category table
    Categorical,
    /// Percentage in [0, 100]
    Percentage,
}

/// The 12 raw fields in their declared order
pub const RAW_FIELDS: [(&str, FieldKind); 12] = [
    ("gender", FieldKind::Categorical),
    ("ssc_p", FieldKind::Percentage),
    ("ssc_b", FieldKind::Categorical),
    ("hsc_p", FieldKind::Percentage),
    ("hsc_b", FieldKind::Categorical),
    ("hsc_s", FieldKind::Categorical),
    ("degree_p", FieldKind::Percentage),
    ("degree_t", FieldKind::Categorical),
    ("workex", FieldKind::Categorical),
    ("etest_p", FieldKind::Percentage),
    ("specialisation", FieldKind::Categorical),
    ("mba_p", FieldKind::Percentage),
];

/// Names of the categorical raw fields, in declared order
pub const CATEGORICAL_FIELDS: [&str; 7] = [
    "gender",
    "ssc_b",
    "hsc_b",
    "hsc_s",
    "degree_t",
    "workex",
    "specialisation",
];

/// Names of the percentage raw fields, in declared order
pub const PERCENTAGE_FIELDS: [&str; 5] = ["ssc_p", "hsc_p", "degree_p", "etest_p", "mba_p"];

/// A single student's raw profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Gender label (M or F)
    pub gender: String,
    /// Secondary education percentage (10th grade)
    pub ssc_p: f64,
    /// Secondary education board (Central or Others)
    pub ssc_b: String,
    /// Higher secondary percentage (12th grade)
    pub hsc_p: f64,
    /// Higher secondary board (Central or Others)
    pub hsc_b: String,
    /// Higher secondary stream (Commerce, Science or Arts)
    pub hsc_s: String,
    /// Undergraduate degree percentage
    pub degree_p: f64,
    /// Degree type (Sci&Tech, Comm&Mgmt or Others)
    pub degree_t: String,
    /// Work experience (Yes or No)
    pub workex: String,
    /// Employability test percentage
    pub etest_p: f64,
    /// MBA specialisation (Mkt&HR or Mkt&Fin)
    pub specialisation: String,
    /// MBA percentage
    pub mba_p: f64,
}

impl StudentRecord {
    /// Build a record from an untyped JSON object.
    ///
    /// Absent (or null) fields fail with `MissingField`; wrongly typed values
    /// and percentages outside [0, 100] fail with `InvalidInput`.
    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self> {
        let record = Self {
            gender: json_label(map, "gender")?,
            ssc_p: json_percentage(map, "ssc_p")?,
            ssc_b: json_label(map, "ssc_b")?,
            hsc_p: json_percentage(map, "hsc_p")?,
            hsc_b: json_label(map, "hsc_b")?,
            hsc_s: json_label(map, "hsc_s")?,
            degree_p: json_percentage(map, "degree_p")?,
            degree_t: json_label(map, "degree_t")?,
            workex: json_label(map, "workex")?,
            etest_p: json_percentage(map, "etest_p")?,
            specialisation: json_label(map, "specialisation")?,
            mba_p: json_percentage(map, "mba_p")?,
        };
        record.validate()?;
        Ok(record)
    }

    /// Build a record from any JSON value; the value must be an object.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Self::from_json_map(map),
            other => Err(PlacementError::InvalidInput(format!(
                "student record must be a JSON object, got {}",
                json_type_name(other)
            ))),
        }
    }

    /// Check every percentage lies in [0, 100] and every label is non-empty
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.percentages() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(PlacementError::InvalidInput(format!(
                    "{} must be a percentage in [0, 100], got {}",
                    name, value
                )));
            }
        }
        for (name, label) in self.categoricals() {
            if label.trim().is_empty() {
                return Err(PlacementError::InvalidInput(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Categorical labels paired with their field names, in declared order
    pub fn categoricals(&self) -> [(&'static str, &str); 7] {
        [
            ("gender", self.gender.as_str()),
            ("ssc_b", self.ssc_b.as_str()),
            ("hsc_b", self.hsc_b.as_str()),
            ("hsc_s", self.hsc_s.as_str()),
            ("degree_t", self.degree_t.as_str()),
            ("workex", self.workex.as_str()),
            ("specialisation", self.specialisation.as_str()),
        ]
    }

    /// Percentages paired with their field names, in declared order
    pub fn percentages(&self) -> [(&'static str, f64); 5] {
        [
            ("ssc_p", self.ssc_p),
            ("hsc_p", self.hsc_p),
            ("degree_p", self.degree_p),
            ("etest_p", self.etest_p),
            ("mba_p", self.mba_p),
        ]
    }

    /// Mean of the three academic percentages (secondary, higher secondary, degree)
    pub fn academic_average(&self) -> f64 {
        (self.ssc_p + self.hsc_p + self.degree_p) / 3.0
    }

    /// Whether the student reported work experience
    pub fn has_work_experience(&self) -> bool {
        self.workex.eq_ignore_ascii_case("yes")
    }

    /// Sample profile used by the CLI and in documentation
    pub fn example() -> Self {
        Self {
            gender: "M".to_string(),
            ssc_p: 67.0,
            ssc_b: "Others".to_string(),
            hsc_p: 91.0,
            hsc_b: "Others".to_string(),
            hsc_s: "Commerce".to_string(),
            degree_p: 58.0,
            degree_t: "Sci&Tech".to_string(),
            workex: "No".to_string(),
            etest_p: 55.0,
            specialisation: "Mkt&HR".to_string(),
            mba_p: 58.8,
        }
    }
}

fn json_field<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a Value> {
    match map.get(name) {
        None | Some(Value::Null) => Err(PlacementError::MissingField(name.to_string())),
        Some(value) => Ok(value),
    }
}

fn json_label(map: &Map<String, Value>, name: &str) -> Result<String> {
    match json_field(map, name)? {
        Value::String(s) => Ok(s.trim().to_string()),
        other => Err(PlacementError::InvalidInput(format!(
            "{} must be a string label, got {}",
            name,
            json_type_name(other)
        ))),
    }
}

fn json_percentage(map: &Map<String, Value>, name: &str) -> Result<f64> {
    match json_field(map, name)? {
        Value::Number(n) => n.as_f64().ok_or_else(|| {
            PlacementError::InvalidInput(format!("{} is not representable as f64", name))
        }),
        other => Err(PlacementError::InvalidInput(format!(
            "{} must be a number, got {}",
            name,
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn example_json() -> Value {
        serde_json::to_value(StudentRecord::example()).unwrap()
    }

    #[test]
    fn test_from_json_roundtrip() {
        let record = StudentRecord::from_json(&example_json()).unwrap();
        assert_eq!(record, StudentRecord::example());
    }

    #[test]
    fn test_missing_field() {
        let mut value = example_json();
        value.as_object_mut().unwrap().remove("etest_p");
        let err = StudentRecord::from_json(&value).unwrap_err();
        assert!(matches!(err, PlacementError::MissingField(ref f) if f == "etest_p"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut value = example_json();
        value["workex"] = Value::Null;
        let err = StudentRecord::from_json(&value).unwrap_err();
        assert!(matches!(err, PlacementError::MissingField(ref f) if f == "workex"));
    }

    #[test]
    fn test_out_of_range_percentage() {
        let mut value = example_json();
        value["mba_p"] = json!(101.5);
        let err = StudentRecord::from_json(&value).unwrap_err();
        assert!(matches!(err, PlacementError::InvalidInput(_)));
    }

    #[test]
    fn test_wrong_type() {
        let mut value = example_json();
        value["ssc_p"] = json!("sixty");
        assert!(matches!(
            StudentRecord::from_json(&value),
            Err(PlacementError::InvalidInput(_))
        ));
        assert!(StudentRecord::from_json(&json!([1, 2, 3])).is_err());
    }

    #[test]
    fn test_academic_average() {
        let record = StudentRecord::example();
        assert!((record.academic_average() - (67.0 + 91.0 + 58.0) / 3.0).abs() < 1e-12);
        assert!(!record.has_work_experience());
    }
}
