//! Shared types, errors, and configuration for the microloan backend.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Major/minor currency unit conversion
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, PaymentsConfig};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
