//! Application service: the request-level entry point.
//!
//! Every operation follows the same path: load, authorize, reconcile, apply
//! the ledger or workflow rule, then save with a version check. A version
//! conflict re-reads the record and re-validates from scratch.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use microloan_shared::types::{ApplicationId, MinorUnits};
use microloan_shared::{AppError, AppResult, PaymentsConfig};

use super::types::{ConfirmOutcome, LedgerView, ManualRepayment, NewApplication};
use crate::auth::{Action, Actor, AuthorizationGuard};
use crate::ledger::{
    AmountReconciler, LoanApplication, PAYMENT_METHOD_MANUAL, RepaymentInput, RepaymentLedger,
};
use crate::payment::{
    Confirmation, GATEWAY_INTENT_PREFIX, PaymentError, PaymentGateway, PaymentIntent, PaymentKind,
    PaymentService,
};
use crate::store::{ApplicationStore, StoreError};
use crate::workflow::ApplicationWorkflow;

/// Attempts at a conditional write before giving up with `Conflict`.
const MAX_WRITE_ATTEMPTS: usize = 3;

/// Orchestrates applications, repayments and payments over a store.
#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn ApplicationStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    payments: PaymentsConfig,
}

impl ApplicationService {
    /// Creates a service. `gateway` is `None` when payments are not configured.
    #[must_use]
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        gateway: Option<Arc<dyn PaymentGateway>>,
        payments: PaymentsConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            payments,
        }
    }

    /// Submits a new application for the actor.
    pub async fn submit(&self, actor: &Actor, input: NewApplication) -> AppResult<LoanApplication> {
        AuthorizationGuard::require(actor, None, Action::Create)?;

        let app = ApplicationWorkflow::submit(
            actor.user_id,
            input.loan_id,
            input.loan_amount,
            input.interest_rate,
            Utc::now(),
        )?;
        let stored = self.store.insert(&app).await?;

        tracing::info!(
            application_id = %stored.id,
            user_id = %actor.user_id,
            loan_amount = %stored.loan_amount,
            "application submitted"
        );
        Ok(stored)
    }

    /// Returns the reconciled application, persisting a due backfill.
    pub async fn get(&self, actor: &Actor, id: ApplicationId) -> AppResult<LoanApplication> {
        let app = self.store.load(id).await?;
        AuthorizationGuard::require(actor, Some(&app), Action::Read)?;
        Ok(self.backfill(app).await)
    }

    /// Returns the balances and entries of an application.
    pub async fn ledger(&self, actor: &Actor, id: ApplicationId) -> AppResult<LedgerView> {
        let app = self.get(actor, id).await?;
        Ok(LedgerView::from(&app))
    }

    /// Approves a pending application and fixes its total.
    pub async fn approve(&self, actor: &Actor, id: ApplicationId) -> AppResult<LoanApplication> {
        let (app, _) = self
            .update(id, |current| {
                AuthorizationGuard::require(actor, Some(current), Action::Approve)?;
                let (next, change) =
                    ApplicationWorkflow::approve(current, actor.user_id, Utc::now())?;
                tracing::info!(
                    application_id = %id,
                    from = %change.from,
                    to = %change.to,
                    changed_by = %change.changed_by,
                    total = %next.total(),
                    "application approved"
                );
                Ok(Some(next))
            })
            .await?;
        Ok(app)
    }

    /// Rejects a pending application.
    pub async fn reject(&self, actor: &Actor, id: ApplicationId) -> AppResult<LoanApplication> {
        let (app, _) = self
            .update(id, |current| {
                AuthorizationGuard::require(actor, Some(current), Action::Reject)?;
                let (next, change) =
                    ApplicationWorkflow::reject(current, actor.user_id, Utc::now())?;
                tracing::info!(application_id = %id, changed_by = %change.changed_by, "application rejected");
                Ok(Some(next))
            })
            .await?;
        Ok(app)
    }

    /// Cancels a pending application on behalf of its owner.
    pub async fn cancel(&self, actor: &Actor, id: ApplicationId) -> AppResult<LoanApplication> {
        let (app, _) = self
            .update(id, |current| {
                AuthorizationGuard::require(actor, Some(current), Action::Cancel)?;
                let (next, _) = ApplicationWorkflow::cancel(current, actor.user_id, Utc::now())?;
                tracing::info!(application_id = %id, "application cancelled");
                Ok(Some(next))
            })
            .await?;
        Ok(app)
    }

    /// Records a manual repayment.
    ///
    /// A transaction id already in the ledger is rejected with
    /// `DuplicateTransaction`.
    pub async fn record_repayment(
        &self,
        actor: &Actor,
        id: ApplicationId,
        repayment: ManualRepayment,
    ) -> AppResult<LedgerView> {
        // Gateway ids are only recorded through a verified confirmation.
        if let Some(t) = &repayment.transaction_id
            && t.starts_with(GATEWAY_INTENT_PREFIX)
        {
            return Err(AppError::Validation(format!(
                "transactionId must not start with {GATEWAY_INTENT_PREFIX}; card payments are recorded on confirmation"
            )));
        }
        let transaction_id = repayment
            .transaction_id
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| format!("manual_{}", Uuid::now_v7().simple()));
        let payment_method = repayment
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| PAYMENT_METHOD_MANUAL.to_string());

        let (app, _) = self
            .update(id, |current| {
                AuthorizationGuard::require(actor, Some(current), Action::Repay)?;
                let input = RepaymentInput::new(
                    repayment.amount,
                    transaction_id.clone(),
                    payment_method.clone(),
                );
                Ok(Some(RepaymentLedger::record_repayment(current, input, Utc::now())?))
            })
            .await?;

        tracing::info!(
            application_id = %id,
            transaction_id = %transaction_id,
            amount = %repayment.amount,
            remaining = %app.outstanding(),
            status = %app.repayment_status,
            "repayment recorded"
        );
        Ok(LedgerView::from(&app))
    }

    /// Opens a gateway payment intent. Never touches the ledger.
    ///
    /// `amount` is in minor units and ignored for the application fee.
    pub async fn create_payment_intent(
        &self,
        actor: &Actor,
        id: ApplicationId,
        kind: PaymentKind,
        amount: Option<MinorUnits>,
    ) -> AppResult<PaymentIntent> {
        let app = self.store.load(id).await?;
        AuthorizationGuard::require(actor, Some(&app), Action::Pay)?;
        let gateway = self.gateway()?;

        let request = PaymentService::intent_request(
            &app,
            kind,
            amount,
            self.payments.application_fee_minor,
            &self.payments.currency,
        )?;
        let intent = gateway.create_intent(&request).await?;
        let client_secret = intent.client_secret.ok_or_else(|| {
            PaymentError::Transport("gateway response has no client secret".to_string())
        })?;

        tracing::info!(
            application_id = %id,
            intent_id = %intent.id,
            kind = %kind,
            amount = intent.amount,
            "payment intent created"
        );
        Ok(PaymentIntent {
            client_secret,
            intent_id: intent.id,
            amount: intent.amount,
            currency: intent.currency,
        })
    }

    /// Confirms a gateway payment and applies it once.
    ///
    /// Replaying a transaction id returns the current record with
    /// `applied = false`.
    pub async fn confirm_payment(
        &self,
        actor: &Actor,
        id: ApplicationId,
        confirmation: Confirmation,
    ) -> AppResult<ConfirmOutcome> {
        let app = self.store.load(id).await?;
        AuthorizationGuard::require(actor, Some(&app), Action::Pay)?;

        if PaymentService::is_replay(&app, &confirmation) {
            tracing::info!(
                application_id = %id,
                transaction_id = %confirmation.transaction_id,
                "payment already applied"
            );
            return Ok(ConfirmOutcome {
                application: AmountReconciler::reconcile(&app),
                applied: false,
            });
        }
        PaymentService::precheck(&app, &confirmation)?;

        let gateway = self.gateway()?;
        let intent = gateway.retrieve_intent(&confirmation.transaction_id).await?;
        PaymentService::verify_intent(&app, &confirmation, &intent)?;

        let result = self
            .update(id, |current| {
                if PaymentService::is_replay(current, &confirmation) {
                    return Ok(None);
                }
                Ok(Some(PaymentService::apply(current, &confirmation, Utc::now())?))
            })
            .await;

        let (application, applied) = match result {
            Err(AppError::DuplicateTransaction(_)) => {
                let current = self.store.load(id).await?;
                (AmountReconciler::reconcile(&current), false)
            }
            other => other?,
        };

        tracing::info!(
            application_id = %id,
            transaction_id = %confirmation.transaction_id,
            kind = %confirmation.kind,
            applied,
            "payment confirmed"
        );
        Ok(ConfirmOutcome {
            application,
            applied,
        })
    }

    fn gateway(&self) -> Result<&Arc<dyn PaymentGateway>, PaymentError> {
        self.gateway.as_ref().ok_or(PaymentError::Unavailable)
    }

    /// Persists the reconciled form of an approved legacy record.
    ///
    /// A failed backfill does not fail the read.
    async fn backfill(&self, app: LoanApplication) -> LoanApplication {
        let reconciled = AmountReconciler::reconcile(&app);
        if !AmountReconciler::needs_backfill(&app) {
            return reconciled;
        }

        match self.store.save(&reconciled).await {
            Ok(saved) => {
                tracing::info!(
                    application_id = %saved.id,
                    total = %saved.total(),
                    "backfilled derived amounts"
                );
                saved
            }
            Err(err) => {
                tracing::warn!(application_id = %app.id, error = %err, "backfill not persisted");
                reconciled
            }
        }
    }

    /// Load, change, conditional save; retried on version conflicts.
    ///
    /// `change` returns `None` when there is nothing to write. The bool in
    /// the result is true if a write happened.
    async fn update<F>(
        &self,
        id: ApplicationId,
        mut change: F,
    ) -> AppResult<(LoanApplication, bool)>
    where
        F: FnMut(&LoanApplication) -> AppResult<Option<LoanApplication>> + Send,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let current = self.store.load(id).await?;
            let Some(next) = change(&current)? else {
                return Ok((AmountReconciler::reconcile(&current), false));
            };

            match self.store.save(&next).await {
                Ok(saved) => return Ok((saved, true)),
                Err(StoreError::Conflict { .. }) => {
                    tracing::debug!(application_id = %id, attempt, "version conflict, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        tracing::warn!(application_id = %id, "write abandoned after repeated version conflicts");
        Err(AppError::Conflict(format!(
            "Application {id} is being modified concurrently; please retry"
        )))
    }
}
