use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    store::{StoreError, Video, VideoDraft, VideoStatus},
    videos::dto::{CreateVideoRequest, MAX_PROMPT_LENGTH},
};

#[instrument(skip(state))]
pub async fn list_videos(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> ApiResult<Json<Vec<Video>>> {
    let videos = state.store.list_videos(user_id).await?;
    Ok(Json(videos))
}

/// Generation is stubbed: the request is charged, then recorded as already
/// completed with the configured sample media. A real pipeline would insert
/// the record as `pending` and flip it from a worker.
#[instrument(skip(state, payload))]
pub async fn create_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateVideoRequest>,
) -> ApiResult<(StatusCode, Json<Video>)> {
    let prompt = payload.prompt.trim().to_string();
    if prompt.is_empty() {
        warn!(user_id = %user_id, "empty prompt");
        return Err(ApiError::Validation("Prompt is required".into()));
    }
    if prompt.chars().count() > MAX_PROMPT_LENGTH {
        warn!(user_id = %user_id, len = prompt.chars().count(), "prompt too long");
        return Err(ApiError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_LENGTH} characters"
        )));
    }

    let video = state
        .store
        .create_video(
            user_id,
            VideoDraft {
                prompt,
                status: VideoStatus::Completed,
                video_url: Some(state.config.sample_video_url.clone()),
                thumbnail: Some(state.config.sample_thumbnail.clone()),
                cost: state.config.generation_cost,
            },
        )
        .await?;

    info!(user_id = %user_id, video_id = %video.id, "video generated");
    Ok((StatusCode::CREATED, Json(video)))
}

#[instrument(skip(state))]
pub async fn get_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Video>> {
    let video = state
        .store
        .get_video(user_id, id)
        .await?
        .ok_or(StoreError::NotFound("video"))?;
    Ok(Json(video))
}

#[instrument(skip(state))]
pub async fn delete_video(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = state.store.delete_video(user_id, id).await?;
    if !deleted {
        return Err(StoreError::NotFound("video").into());
    }
    info!(user_id = %user_id, video_id = %id, "video deleted");
    Ok(Json(
        serde_json::json!({ "message": "Video deleted successfully" }),
    ))
}
