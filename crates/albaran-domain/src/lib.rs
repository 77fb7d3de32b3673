//! Domain vocabulary shared by the albaran service crates.
//!
//! Pure types with no framework dependencies: the email shape check, the
//! field-rule schema used to validate inputs, and the workflow status enums.

pub mod email;
pub mod schema;
pub mod status;
