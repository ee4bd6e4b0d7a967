//! Repayment ledger routes.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApplicationPath, ValidJson},
    middleware::AuthUser,
};
use microloan_core::application::ManualRepayment;

/// Creates the repayment routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/repayments/{application_id}",
        get(get_ledger).post(record_repayment),
    )
}

/// Request body for a manual repayment.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRepaymentRequest {
    /// Amount in major units.
    pub amount: Decimal,
    /// External reference.
    pub transaction_id: Option<String>,
    /// Payment method tag.
    pub payment_method: Option<String>,
}

/// GET /repayments/{application_id}
async fn get_ledger(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
) -> ApiResult<impl IntoResponse> {
    let view = state.applications.ledger(&actor, id).await?;
    Ok(Json(view))
}

/// POST /repayments/{application_id}
async fn record_repayment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
    ValidJson(body): ValidJson<RecordRepaymentRequest>,
) -> ApiResult<impl IntoResponse> {
    let view = state
        .applications
        .record_repayment(
            &actor,
            id,
            ManualRepayment {
                amount: body.amount,
                transaction_id: body.transaction_id,
                payment_method: body.payment_method,
            },
        )
        .await?;
    Ok(Json(view))
}
