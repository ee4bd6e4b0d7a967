//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{MAX_AMOUNT, MinorUnits, MoneyError, from_minor_units, to_minor_units};
