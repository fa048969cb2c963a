use crate::state::AppState;
use axum::{
    routing::post,
    Router,
};

mod dto;
pub mod handlers;
pub mod password;
pub mod session;

pub use session::AuthUser;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/logout", post(handlers::logout))
}
