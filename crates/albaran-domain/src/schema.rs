//! Field-rule schemas for input validation.
//!
//! Every input type declares its rules once as a `SCHEMA` table and exposes
//! its fields through [`Validate::value`]. [`validate`] walks the table in
//! declaration order and reports the first violation, so the error always
//! names a single field.
//!
//! ```
//! use albaran_domain::schema::{FieldRule, FieldValue, Rule, Validate, validate};
//!
//! struct Login {
//!     email: Option<String>,
//! }
//!
//! impl Validate for Login {
//!     const SCHEMA: &'static [FieldRule] =
//!         &[FieldRule::new("email", &[Rule::Required, Rule::Email])];
//!
//!     fn value(&self, field: &str) -> FieldValue<'_> {
//!         match field {
//!             "email" => FieldValue::text(&self.email),
//!             _ => FieldValue::Absent,
//!         }
//!     }
//! }
//!
//! let err = validate(&Login { email: None }).unwrap_err();
//! assert_eq!(err.to_string(), "email is required");
//! assert!(validate(&Login { email: Some("a@b.co".into()) }).is_ok());
//! ```

use crate::email::is_valid_email;

/// A single constraint on a field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Field must be present; text must not be blank.
    Required,
    /// Text, when present, must not be blank. Used by patches.
    NonEmpty,
    /// Text, when present, must have the `local@domain.tld` shape.
    Email,
    /// Text, when present, must have at least this many characters.
    MinLength(usize),
    /// Number, when present, must be `>= 0`.
    NonNegative,
}

/// The rules attached to one named field.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRule {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }
}

/// A field value as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Absent,
    Text(&'a str),
    Number(f64),
    /// Present but not inspected further (ids, dates, lists).
    Present,
}

impl<'a> FieldValue<'a> {
    pub fn text(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Self::Absent, Self::Text)
    }

    pub fn number(value: Option<f64>) -> Self {
        value.map_or(Self::Absent, Self::Number)
    }

    pub fn presence<T>(value: &Option<T>) -> Self {
        if value.is_some() {
            Self::Present
        } else {
            Self::Absent
        }
    }
}

/// Implemented by every validated input type.
pub trait Validate {
    const SCHEMA: &'static [FieldRule];

    fn value(&self, field: &str) -> FieldValue<'_>;
}

/// Why a field failed its rules.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Violation {
    #[error("is required")]
    Missing,
    #[error("must not be empty")]
    Empty,
    #[error("must be a valid email")]
    InvalidEmail,
    #[error("must be at least {0} characters")]
    TooShort(usize),
    #[error("must not be negative")]
    Negative,
}

/// First rule violation found in an input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{field} {violation}")]
pub struct SchemaError {
    pub field: &'static str,
    pub violation: Violation,
}

/// Check `input` against its schema, stopping at the first violation.
pub fn validate<T: Validate>(input: &T) -> Result<(), SchemaError> {
    for field_rule in T::SCHEMA {
        let value = input.value(field_rule.field);
        for rule in field_rule.rules {
            check(*rule, value).map_err(|violation| SchemaError {
                field: field_rule.field,
                violation,
            })?;
        }
    }
    Ok(())
}

fn check(rule: Rule, value: FieldValue<'_>) -> Result<(), Violation> {
    match (rule, value) {
        (Rule::Required, FieldValue::Absent) => Err(Violation::Missing),
        (Rule::Required, FieldValue::Text(s)) if s.trim().is_empty() => Err(Violation::Missing),
        (Rule::NonEmpty, FieldValue::Text(s)) if s.trim().is_empty() => Err(Violation::Empty),
        (Rule::Email, FieldValue::Text(s)) if !is_valid_email(s) => Err(Violation::InvalidEmail),
        (Rule::MinLength(min), FieldValue::Text(s)) if s.chars().count() < min => {
            Err(Violation::TooShort(min))
        }
        (Rule::NonNegative, FieldValue::Number(n)) if n.is_nan() || n < 0.0 => {
            Err(Violation::Negative)
        }
        _ => Ok(()),
    }
}
