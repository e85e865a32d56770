//! The User entity as stored and exchanged over the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Wire format for calendar dates (`birthDate`, search bounds).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A user record.
///
/// Required fields are modelled as `Option` so that a request body missing
/// them still deserializes and is rejected by the validation rules with the
/// proper message instead of a generic decoding error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned identifier, `None` until the user is first saved.
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            email: Some(email.into()),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            birth_date: Some(birth_date),
            address: None,
            phone_number: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    /// Apply a full replacement from `candidate`.
    ///
    /// Required fields are always overwritten. `address` and `phoneNumber`
    /// are only overwritten when the candidate carries a value; `None` leaves
    /// the stored value in place. The identifier is never touched.
    pub fn replace_with(&mut self, candidate: User) {
        self.email = candidate.email;
        self.first_name = candidate.first_name;
        self.last_name = candidate.last_name;
        self.birth_date = candidate.birth_date;
        if let Some(address) = candidate.address {
            self.address = Some(address);
        }
        if let Some(phone_number) = candidate.phone_number {
            self.phone_number = Some(phone_number);
        }
    }
}
