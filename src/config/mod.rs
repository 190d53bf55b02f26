//! Configuration module
//!
//! Loads and validates actor and scenario files: actor capabilities, state
//! machines, and the contacts a headless run reports.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLimits, ConfigLoader, LoadResult, LoadWarning, LoaderOptions};
pub use schema::*;
pub use validation::{ValidationResult, Validator, suggest};
