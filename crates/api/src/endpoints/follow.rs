//! Follow feed and follow/unfollow endpoints.

use axum::{
    Router,
    extract::{Path, State},
    response::Response,
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;

use super::profile_url;
use crate::{
    extractors::{AuthUser, PageParam},
    middleware::AppState,
    response::{View, found},
};

/// Posts by the authors the signed-in user follows.
async fn feed(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    PageParam(page): PageParam,
) -> AppResult<View> {
    let page_obj = state.post_service.feed(&user.id, page).await?;
    Ok(View::new("posts/follow.html", json!({ "page_obj": page_obj })))
}

async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let (author, _) = state.following_service.follow(&user.id, &username).await?;
    Ok(found(profile_url(&author.username)))
}

async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Response> {
    let author = state.following_service.unfollow(&user.id, &username).await?;
    Ok(found(profile_url(&author.username)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(feed))
        .route("/profile/{username}/follow/", get(follow).post(follow))
        .route("/profile/{username}/unfollow/", get(unfollow).post(unfollow))
}
