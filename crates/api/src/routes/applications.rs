//! Loan application routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApplicationPath, ValidJson},
    middleware::AuthUser,
};
use microloan_core::application::NewApplication;
use microloan_shared::types::LoanId;

/// Creates the application routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/applications", post(submit_application))
        .route("/applications/{id}", get(get_application))
        .route("/applications/{id}/approve", post(approve_application))
        .route("/applications/{id}/reject", post(reject_application))
        .route("/applications/{id}/cancel", post(cancel_application))
}

/// Request body for submitting an application.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitApplicationRequest {
    /// Loan product.
    pub loan_id: LoanId,
    /// Principal in major units.
    pub loan_amount: Decimal,
    /// Interest rate in percent.
    pub interest_rate: Option<Decimal>,
}

/// POST /applications
async fn submit_application(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ValidJson(body): ValidJson<SubmitApplicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let app = state
        .applications
        .submit(
            &actor,
            NewApplication {
                loan_id: body.loan_id,
                loan_amount: body.loan_amount,
                interest_rate: body.interest_rate,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(app)))
}

/// GET /applications/{id}
async fn get_application(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
) -> ApiResult<impl IntoResponse> {
    let app = state.applications.get(&actor, id).await?;
    Ok(Json(app))
}

/// POST /applications/{id}/approve
async fn approve_application(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
) -> ApiResult<impl IntoResponse> {
    let app = state.applications.approve(&actor, id).await?;
    Ok(Json(app))
}

/// POST /applications/{id}/reject
async fn reject_application(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
) -> ApiResult<impl IntoResponse> {
    let app = state.applications.reject(&actor, id).await?;
    Ok(Json(app))
}

/// POST /applications/{id}/cancel
async fn cancel_application(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApplicationPath(id): ApplicationPath,
) -> ApiResult<impl IntoResponse> {
    let app = state.applications.cancel(&actor, id).await?;
    Ok(Json(app))
}
