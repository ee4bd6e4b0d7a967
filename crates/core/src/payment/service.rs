//! Payment rules for intent creation and confirmation.
//!
//! Pure functions over the application. Gateway calls and persistence are
//! done by the caller between these steps.

use chrono::{DateTime, Utc};

use microloan_shared::types::{MinorUnits, from_minor_units, to_minor_units};

use super::error::PaymentError;
use super::types::{Confirmation, GatewayIntent, IntentRequest, IntentStatus, PaymentKind};
use crate::ledger::{
    AmountReconciler, FeeStatus, LedgerError, LoanApplication, MAX_TRANSACTION_ID_LEN,
    PAYMENT_METHOD_CARD, PaymentDetails, RepaymentInput, RepaymentLedger,
};
use crate::workflow::ApplicationStatus;

/// Stateless payment rules.
pub struct PaymentService;

impl PaymentService {
    /// Builds the gateway request for a new intent.
    ///
    /// - `ApplicationFee`: the amount is `fee_minor`; the fee must be unpaid.
    /// - `Repayment`: the amount is caller-supplied, positive, and within
    ///   the reconciled remaining balance; the application must be approved.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError` if the application cannot take this payment.
    pub fn intent_request(
        app: &LoanApplication,
        kind: PaymentKind,
        amount: Option<MinorUnits>,
        fee_minor: MinorUnits,
        currency: &str,
    ) -> Result<IntentRequest, PaymentError> {
        let amount = match kind {
            PaymentKind::ApplicationFee => {
                if app.application_fee_status == FeeStatus::Paid {
                    return Err(PaymentError::FeeAlreadyPaid);
                }
                fee_minor
            }
            PaymentKind::Repayment => {
                if app.status != ApplicationStatus::Approved {
                    return Err(PaymentError::NotApproved(app.status));
                }
                let minor = amount.unwrap_or(0);
                if minor <= 0 {
                    return Err(PaymentError::NonPositiveAmount);
                }
                let remaining = AmountReconciler::reconcile(app).outstanding();
                if minor > to_minor_units(remaining)? {
                    return Err(LedgerError::ExceedsRemaining {
                        amount: from_minor_units(minor),
                        remaining,
                    }
                    .into());
                }
                minor
            }
        };

        Ok(IntentRequest {
            application_id: app.id,
            kind,
            amount,
            currency: currency.to_string(),
        })
    }

    /// Returns true if this confirmation was already applied.
    #[must_use]
    pub fn is_replay(app: &LoanApplication, confirmation: &Confirmation) -> bool {
        match confirmation.kind {
            PaymentKind::Repayment => app.has_transaction(&confirmation.transaction_id),
            PaymentKind::ApplicationFee => app
                .payment_details
                .as_ref()
                .is_some_and(|d| d.transaction_id == confirmation.transaction_id),
        }
    }

    /// Checks that need no gateway round-trip.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransactionId` unless the id is 1 to 255 ASCII
    /// letters, digits or underscores, `NonPositiveAmount`, or
    /// `FeeAlreadyPaid` for a fee confirmed under a different transaction id.
    pub fn precheck(app: &LoanApplication, confirmation: &Confirmation) -> Result<(), PaymentError> {
        if !Self::is_valid_intent_id(&confirmation.transaction_id) {
            return Err(PaymentError::InvalidTransactionId(
                confirmation.transaction_id.chars().take(64).collect(),
            ));
        }
        if confirmation.amount <= 0 {
            return Err(PaymentError::NonPositiveAmount);
        }
        if confirmation.kind == PaymentKind::ApplicationFee
            && app.application_fee_status == FeeStatus::Paid
        {
            return Err(PaymentError::FeeAlreadyPaid);
        }
        Ok(())
    }

    /// Returns true if `id` has the shape of a gateway intent id.
    #[must_use]
    pub fn is_valid_intent_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= MAX_TRANSACTION_ID_LEN
            && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
    }

    /// Checks the gateway's view of the intent against the confirmation.
    ///
    /// # Errors
    ///
    /// Returns `NotSucceeded`, `IntentMismatch` or `AmountMismatch`.
    pub fn verify_intent(
        app: &LoanApplication,
        confirmation: &Confirmation,
        intent: &GatewayIntent,
    ) -> Result<(), PaymentError> {
        if intent.id != confirmation.transaction_id || !intent.is_for(app.id, confirmation.kind) {
            return Err(PaymentError::IntentMismatch(
                confirmation.transaction_id.clone(),
            ));
        }
        if intent.status != IntentStatus::Succeeded {
            return Err(PaymentError::NotSucceeded {
                transaction_id: confirmation.transaction_id.clone(),
            });
        }
        if intent.amount != confirmation.amount {
            return Err(PaymentError::AmountMismatch {
                confirmed: confirmation.amount,
                captured: intent.amount,
            });
        }
        Ok(())
    }

    /// Applies a verified confirmation and returns the updated application.
    ///
    /// # Errors
    ///
    /// Returns `FeeAlreadyPaid` or any `LedgerError` from the repayment.
    pub fn apply(
        app: &LoanApplication,
        confirmation: &Confirmation,
        now: DateTime<Utc>,
    ) -> Result<LoanApplication, PaymentError> {
        let amount = from_minor_units(confirmation.amount);

        match confirmation.kind {
            PaymentKind::Repayment => {
                let input = RepaymentInput::new(
                    amount,
                    confirmation.transaction_id.clone(),
                    PAYMENT_METHOD_CARD,
                );
                Ok(RepaymentLedger::record_repayment(app, input, now)?)
            }
            PaymentKind::ApplicationFee => {
                Self::precheck(app, confirmation)?;
                let mut next = app.clone();
                next.application_fee_status = FeeStatus::Paid;
                next.payment_details = Some(PaymentDetails {
                    transaction_id: confirmation.transaction_id.clone(),
                    amount,
                    paid_at: now,
                    payment_method: PAYMENT_METHOD_CARD.to_string(),
                });
                next.updated_at = now;
                Ok(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microloan_shared::types::{LoanId, UserId};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    use crate::ledger::RepaymentStatus;
    use crate::payment::types::{METADATA_APPLICATION_ID, METADATA_KIND};

    fn approved() -> LoanApplication {
        let mut app =
            LoanApplication::new(UserId::new(), LoanId::new(), dec!(1000), Some(dec!(10)), Utc::now());
        app.status = ApplicationStatus::Approved;
        AmountReconciler::reconcile(&app)
    }

    fn intent_for(app: &LoanApplication, id: &str, kind: PaymentKind, amount: MinorUnits) -> GatewayIntent {
        GatewayIntent {
            id: id.to_string(),
            client_secret: Some(format!("{id}_secret")),
            amount,
            currency: "usd".into(),
            status: IntentStatus::Succeeded,
            metadata: HashMap::from([
                (METADATA_APPLICATION_ID.to_string(), app.id.to_string()),
                (METADATA_KIND.to_string(), kind.as_str().to_string()),
            ]),
        }
    }

    fn confirmation(id: &str, kind: PaymentKind, amount: MinorUnits) -> Confirmation {
        Confirmation {
            transaction_id: id.to_string(),
            amount,
            kind,
        }
    }

    #[test]
    fn test_fee_intent_uses_configured_amount() {
        let app = approved();
        let req =
            PaymentService::intent_request(&app, PaymentKind::ApplicationFee, Some(1), 1000, "usd")
                .unwrap();
        assert_eq!(req.amount, 1000);
        assert_eq!(req.kind, PaymentKind::ApplicationFee);
    }

    #[test]
    fn test_repayment_intent_checked_against_remaining_in_minor_units() {
        let app = approved();
        let req =
            PaymentService::intent_request(&app, PaymentKind::Repayment, Some(110_000), 1000, "usd")
                .unwrap();
        assert_eq!(req.amount, 110_000);

        let err =
            PaymentService::intent_request(&app, PaymentKind::Repayment, Some(110_001), 1000, "usd")
                .unwrap_err();
        assert!(matches!(err, PaymentError::Ledger(LedgerError::ExceedsRemaining { .. })));

        let err = PaymentService::intent_request(&app, PaymentKind::Repayment, None, 1000, "usd")
            .unwrap_err();
        assert_eq!(err, PaymentError::NonPositiveAmount);
    }

    #[test]
    fn test_repayment_intent_requires_approval() {
        let mut app = approved();
        app.status = ApplicationStatus::Pending;
        let err = PaymentService::intent_request(&app, PaymentKind::Repayment, Some(100), 1000, "usd")
            .unwrap_err();
        assert_eq!(err, PaymentError::NotApproved(ApplicationStatus::Pending));
    }

    #[test]
    fn test_confirm_repayment_converts_units() {
        let app = approved();
        let conf = confirmation("pi_1", PaymentKind::Repayment, 60_000);
        let intent = intent_for(&app, "pi_1", PaymentKind::Repayment, 60_000);

        PaymentService::verify_intent(&app, &conf, &intent).unwrap();
        let next = PaymentService::apply(&app, &conf, Utc::now()).unwrap();
        assert_eq!(next.paid_amount, dec!(600));
        assert_eq!(next.remaining_amount, Some(dec!(500)));
        assert_eq!(next.repayment_status, RepaymentStatus::InProgress);
        assert_eq!(next.repayments[0].payment_method, PAYMENT_METHOD_CARD);
        assert!(PaymentService::is_replay(&next, &conf));
    }

    #[test]
    fn test_confirm_fee_records_details() {
        let app = approved();
        let conf = confirmation("pi_fee", PaymentKind::ApplicationFee, 1000);
        let next = PaymentService::apply(&app, &conf, Utc::now()).unwrap();
        assert_eq!(next.application_fee_status, FeeStatus::Paid);
        let details = next.payment_details.as_ref().unwrap();
        assert_eq!(details.amount, dec!(10));
        assert_eq!(details.transaction_id, "pi_fee");
        assert!(PaymentService::is_replay(&next, &conf));

        let other = confirmation("pi_other", PaymentKind::ApplicationFee, 1000);
        assert!(!PaymentService::is_replay(&next, &other));
        assert_eq!(
            PaymentService::precheck(&next, &other),
            Err(PaymentError::FeeAlreadyPaid)
        );
    }

    #[test]
    fn test_precheck_rejects_malformed_transaction_ids() {
        let app = approved();
        for id in ["", "pi_1/../balance", "pi 1", "pi_1?x=y", "pi_é"] {
            let err = PaymentService::precheck(&app, &confirmation(id, PaymentKind::Repayment, 100))
                .unwrap_err();
            assert!(matches!(err, PaymentError::InvalidTransactionId(_)), "{id:?}");
        }
        let too_long = format!("pi_{}", "a".repeat(MAX_TRANSACTION_ID_LEN));
        assert!(!PaymentService::is_valid_intent_id(&too_long));
        assert!(
            PaymentService::precheck(&app, &confirmation("pi_3MtwBw2eZvKYlo2C", PaymentKind::Repayment, 100))
                .is_ok()
        );
    }

    #[test]
    fn test_verify_intent_rejects_mismatches() {
        let app = approved();
        let conf = confirmation("pi_1", PaymentKind::Repayment, 60_000);

        let mut intent = intent_for(&app, "pi_1", PaymentKind::Repayment, 60_000);
        intent.status = IntentStatus::RequiresPaymentMethod;
        assert!(matches!(
            PaymentService::verify_intent(&app, &conf, &intent),
            Err(PaymentError::NotSucceeded { .. })
        ));

        let intent = intent_for(&app, "pi_1", PaymentKind::ApplicationFee, 60_000);
        assert!(matches!(
            PaymentService::verify_intent(&app, &conf, &intent),
            Err(PaymentError::IntentMismatch(_))
        ));

        let intent = intent_for(&app, "pi_1", PaymentKind::Repayment, 50_000);
        assert_eq!(
            PaymentService::verify_intent(&app, &conf, &intent),
            Err(PaymentError::AmountMismatch {
                confirmed: 60_000,
                captured: 50_000,
            })
        );
    }
}
