//! Validation rules a user must satisfy before it is persisted.
//!
//! Rules are plain functions evaluated in a fixed order. Every rule runs on
//! every candidate; a failing rule adds a [`Violation`] and evaluation moves
//! on to the next one.

use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::Serialize;

use crate::user::User;

/// Local part, `@`, then at least two dot-separated domain labels.
const EMAIL_PATTERN: &str =
    r"^[A-Za-z0-9_!#$%&'*+/=?`{|}~^.-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)+$";

pub const EMAIL_EMPTY: &str = "Email can't be empty";
pub const EMAIL_FORMAT: &str = "Email must be in email address format";
pub const FIRST_NAME_EMPTY: &str = "First name can't be empty";
pub const LAST_NAME_EMPTY: &str = "Last name can't be empty";
pub const BIRTH_DATE_EMPTY: &str = "Date can't be empty";
pub const BIRTH_DATE_NOT_PAST: &str = "Date must be earlier than current date";

/// A single failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Wire name of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty set of violations produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} validation rule(s) failed", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Violation messages in rule order.
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

/// Inputs a rule may need besides the user itself.
struct RuleContext {
    today: NaiveDate,
    minimum_age: u32,
}

type Rule = fn(&User, &RuleContext) -> Option<Violation>;

const RULES: &[Rule] = &[
    email_not_blank,
    email_format,
    first_name_not_blank,
    last_name_not_blank,
    birth_date_present,
    birth_date_in_past,
    age_above_minimum,
];

/// Evaluates the user rule set.
#[derive(Debug, Clone)]
pub struct UserValidator {
    minimum_age: u32,
}

impl UserValidator {
    pub fn new(minimum_age: u32) -> Self {
        Self { minimum_age }
    }

    /// Validate against today's UTC date.
    pub fn validate(&self, user: &User) -> Result<(), ValidationError> {
        self.validate_on(user, Utc::now().date_naive())
    }

    /// Validate with an explicit reference date for "now".
    pub fn validate_on(&self, user: &User, today: NaiveDate) -> Result<(), ValidationError> {
        let ctx = RuleContext {
            today,
            minimum_age: self.minimum_age,
        };
        let violations: Vec<Violation> = RULES.iter().filter_map(|rule| rule(user, &ctx)).collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

/// Whole years elapsed between `birth_date` and `today`.
///
/// Negative when the birth date lies in the future.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |s| s.trim().is_empty())
}

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).ok()).as_ref()
}

fn violation(field: &'static str, message: impl Into<String>) -> Option<Violation> {
    Some(Violation {
        field,
        message: message.into(),
    })
}

fn email_not_blank(user: &User, _: &RuleContext) -> Option<Violation> {
    if is_blank(user.email.as_deref()) {
        return violation("email", EMAIL_EMPTY);
    }
    None
}

fn email_format(user: &User, _: &RuleContext) -> Option<Violation> {
    // Blank emails are reported by `email_not_blank` only.
    let email = user.email.as_deref().filter(|s| !s.trim().is_empty())?;
    let matches = email_regex().map_or(false, |re| re.is_match(email));
    if !matches {
        return violation("email", EMAIL_FORMAT);
    }
    None
}

fn first_name_not_blank(user: &User, _: &RuleContext) -> Option<Violation> {
    if is_blank(user.first_name.as_deref()) {
        return violation("firstName", FIRST_NAME_EMPTY);
    }
    None
}

fn last_name_not_blank(user: &User, _: &RuleContext) -> Option<Violation> {
    if is_blank(user.last_name.as_deref()) {
        return violation("lastName", LAST_NAME_EMPTY);
    }
    None
}

fn birth_date_present(user: &User, _: &RuleContext) -> Option<Violation> {
    if user.birth_date.is_none() {
        return violation("birthDate", BIRTH_DATE_EMPTY);
    }
    None
}

fn birth_date_in_past(user: &User, ctx: &RuleContext) -> Option<Violation> {
    let birth_date = user.birth_date?;
    if birth_date > ctx.today {
        return violation("birthDate", BIRTH_DATE_NOT_PAST);
    }
    None
}

fn age_above_minimum(user: &User, ctx: &RuleContext) -> Option<Violation> {
    let birth_date = user.birth_date?;
    if i64::from(age_on(birth_date, ctx.today)) <= i64::from(ctx.minimum_age) {
        return violation(
            "birthDate",
            format!("User age must be greater than {}", ctx.minimum_age),
        );
    }
    None
}
