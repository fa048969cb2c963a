use axum::{extract::State, Json};
use tracing::{info, instrument};

use crate::{
    auth::AuthUser,
    error::ApiResult,
    state::AppState,
    store::{ProfilePatch, StoreError},
    users::dto::UserView,
};

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<UserView>> {
    let user = state
        .store
        .find_user(user_id)
        .await?
        .ok_or(StoreError::NotFound("user"))?;
    Ok(Json(UserView::from(user)))
}

#[instrument(skip(state, patch))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<Json<UserView>> {
    let user = state.store.update_profile(user_id, patch).await?;
    info!(user_id = %user.id, "profile updated");
    Ok(Json(UserView::from(user)))
}
