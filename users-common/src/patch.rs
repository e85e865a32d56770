//! Partial updates addressed by field name.
//!
//! The patchable surface of [`User`] is a fixed table of wire names and
//! typed setters. Names outside the table, `id` included, are rejected.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::user::{User, DATE_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    #[error("Field '{0}' is not valid.")]
    UnknownField(String),
    #[error("Field '{0}' can't be null.")]
    NullValue(&'static str),
    #[error("Field '{field}' has an invalid value: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

type Setter = fn(&mut User, Value) -> Result<(), PatchError>;

/// Wire name to setter, one entry per patchable field.
const PATCHABLE_FIELDS: &[(&str, Setter)] = &[
    ("email", set_email),
    ("firstName", set_first_name),
    ("lastName", set_last_name),
    ("birthDate", set_birth_date),
    ("address", set_address),
    ("phoneNumber", set_phone_number),
];

fn set_email(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.email = Some(required_string("email", value)?);
    Ok(())
}

fn set_first_name(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.first_name = Some(required_string("firstName", value)?);
    Ok(())
}

fn set_last_name(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.last_name = Some(required_string("lastName", value)?);
    Ok(())
}

fn set_birth_date(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.birth_date = Some(required_date("birthDate", value)?);
    Ok(())
}

fn set_address(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.address = optional_string("address", value)?;
    Ok(())
}

fn set_phone_number(user: &mut User, value: Value) -> Result<(), PatchError> {
    user.phone_number = optional_string("phoneNumber", value)?;
    Ok(())
}

fn setter_for(name: &str) -> Option<Setter> {
    PATCHABLE_FIELDS
        .iter()
        .find(|(field, _)| *field == name)
        .map(|(_, setter)| *setter)
}

/// Apply `fields` to `user`.
///
/// Either every entry is applied or `user` is left untouched. Values are
/// written as given; the validation rules are not consulted.
pub fn apply_patch(user: &mut User, fields: Map<String, Value>) -> Result<(), PatchError> {
    let mut resolved = Vec::with_capacity(fields.len());
    for (name, value) in fields {
        let setter = setter_for(&name).ok_or(PatchError::UnknownField(name))?;
        resolved.push((setter, value));
    }

    let mut patched = user.clone();
    for (setter, value) in resolved {
        setter(&mut patched, value)?;
    }
    *user = patched;
    Ok(())
}

fn required_string(field: &'static str, value: Value) -> Result<String, PatchError> {
    optional_string(field, value)?.ok_or(PatchError::NullValue(field))
}

fn optional_string(field: &'static str, value: Value) -> Result<Option<String>, PatchError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        other => Err(PatchError::InvalidValue {
            field,
            reason: format!("expected a string, got {}", other),
        }),
    }
}

fn required_date(field: &'static str, value: Value) -> Result<NaiveDate, PatchError> {
    let raw = required_string(field, value)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|e| PatchError::InvalidValue {
        field,
        reason: format!("expected a {} date ({})", DATE_FORMAT, e),
    })
}
