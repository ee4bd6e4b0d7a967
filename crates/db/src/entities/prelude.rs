//! `SeaORM` entity prelude.

pub use super::loan_applications::Entity as LoanApplications;
pub use super::repayments::Entity as Repayments;
