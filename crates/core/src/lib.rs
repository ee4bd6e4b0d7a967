//! Core business logic for the microloan backend.
//!
//! This crate contains the repayment ledger and everything around it with
//! no web framework or database dependencies. Persistence and the payment
//! processor are reached through the `ApplicationStore` and
//! `PaymentGateway` traits.
//!
//! # Modules
//!
//! - `ledger` - Repayment entries, balances and reconciliation
//! - `workflow` - Application lifecycle state machine
//! - `auth` - Roles and the authorization guard
//! - `payment` - Gateway intents and confirmation
//! - `store` - Persistence boundary and the in-memory store
//! - `application` - Request-level orchestration

pub mod application;
pub mod auth;
pub mod ledger;
pub mod payment;
pub mod store;
pub mod workflow;
