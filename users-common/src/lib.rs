//! Users Common Types
//!
//! Entity model, validation rules, field patching and HAL representation
//! types shared by the users service and its tests.

pub mod hal;
pub mod patch;
pub mod user;
pub mod validation;

pub use hal::{CollectionModel, EntityModel, Link, Links, SELF_REL};
pub use patch::{apply_patch, PatchError};
pub use user::{User, DATE_FORMAT};
pub use validation::{age_on, UserValidator, ValidationError, Violation};
