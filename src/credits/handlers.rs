use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    credits::dto::{BalanceResponse, PurchaseRequest},
    error::ApiResult,
    state::AppState,
};

#[instrument(skip(state))]
pub async fn get_balance(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<BalanceResponse>> {
    let credits = state.store.balance(user_id).await?;
    Ok(Json(BalanceResponse { credits }))
}

#[instrument(skip(state))]
pub async fn purchase(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PurchaseRequest>,
) -> ApiResult<Json<BalanceResponse>> {
    let amount = payload.plan.credits();
    let credits = state.store.credit(user_id, amount).await?;
    info!(user_id = %user_id, plan = ?payload.plan, amount, credits, "plan purchased");
    Ok(Json(BalanceResponse { credits }))
}
