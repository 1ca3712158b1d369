//! Profile endpoint.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;

use crate::{
    extractors::{MaybeAuthUser, PageParam},
    middleware::AppState,
    response::View,
};

/// An author's posts, with whether the viewer follows them.
async fn profile(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Path(username): Path<String>,
    PageParam(page): PageParam,
) -> AppResult<View> {
    let listing = state.post_service.author_posts(&username, page).await?;

    let following = match &viewer {
        Some(viewer) => {
            state
                .following_service
                .is_following(&viewer.id, &listing.author.id)
                .await?
        }
        None => false,
    };
    let counts = state.following_service.counts(&listing.author.id).await?;
    let is_own_profile = viewer.is_some_and(|v| v.id == listing.author.id);

    Ok(View::new(
        "posts/profile.html",
        json!({
            "author": listing.author,
            "post_count": listing.post_count,
            "page_obj": listing.page,
            "following": following,
            "follow_counts": counts,
            "is_own_profile": is_own_profile,
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/{username}/", get(profile))
}
