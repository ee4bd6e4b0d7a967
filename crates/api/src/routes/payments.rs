//! Card payment routes.
//!
//! `amount` fields here are integer minor units.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiResult, extractors::ValidJson, middleware::AuthUser};
use microloan_core::ledger::LoanApplication;
use microloan_core::payment::{Confirmation, PaymentKind};
use microloan_shared::types::{ApplicationId, MinorUnits};

/// Creates the payment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/payments/create-repayment-intent",
            post(create_repayment_intent),
        )
        .route(
            "/payments/create-application-fee-intent",
            post(create_application_fee_intent),
        )
        .route("/payments/confirm", post(confirm_payment))
}

/// Request body for a repayment intent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentIntentRequest {
    /// Application to repay.
    pub application_id: ApplicationId,
    /// Amount in minor units.
    pub amount: MinorUnits,
}

/// Request body for an application fee intent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeIntentRequest {
    /// Application whose fee is paid.
    pub application_id: ApplicationId,
}

/// Request body for confirming a payment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    /// Application the payment belongs to.
    pub application_id: ApplicationId,
    /// Gateway payment intent id.
    pub transaction_id: String,
    /// Confirmed amount in minor units.
    pub amount: MinorUnits,
    /// `applicationFee` or `repayment`.
    #[serde(rename = "type")]
    pub kind: PaymentKind,
}

/// Response for a confirmed payment.
#[derive(Debug, Serialize)]
pub struct ConfirmPaymentResponse {
    /// False when the transaction had already been applied.
    pub applied: bool,
    /// The application after confirmation.
    pub application: LoanApplication,
}

/// POST /payments/create-repayment-intent
async fn create_repayment_intent(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidJson(body): ValidJson<RepaymentIntentRequest>,
) -> ApiResult<impl IntoResponse> {
    let intent = state
        .applications
        .create_payment_intent(
            &actor,
            body.application_id,
            PaymentKind::Repayment,
            Some(body.amount),
        )
        .await?;
    Ok(Json(intent))
}

/// POST /payments/create-application-fee-intent
async fn create_application_fee_intent(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidJson(body): ValidJson<FeeIntentRequest>,
) -> ApiResult<impl IntoResponse> {
    let intent = state
        .applications
        .create_payment_intent(
            &actor,
            body.application_id,
            PaymentKind::ApplicationFee,
            None,
        )
        .await?;
    Ok(Json(intent))
}

/// POST /payments/confirm
async fn confirm_payment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidJson(body): ValidJson<ConfirmPaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state
        .applications
        .confirm_payment(
            &actor,
            body.application_id,
            Confirmation {
                transaction_id: body.transaction_id,
                amount: body.amount,
                kind: body.kind,
            },
        )
        .await?;
    Ok(Json(ConfirmPaymentResponse {
        applied: outcome.applied,
        application: outcome.application,
    }))
}
