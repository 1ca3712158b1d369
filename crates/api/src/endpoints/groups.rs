//! Group listing endpoint.

use axum::{
    Router,
    extract::{Path, State},
    routing::get,
};
use serde_json::json;
use yatube_common::AppResult;

use crate::{extractors::PageParam, middleware::AppState, response::View};

/// Posts filed under one group.
async fn group_list(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    PageParam(page): PageParam,
) -> AppResult<View> {
    let listing = state.post_service.group_posts(&slug, page).await?;

    Ok(View::new(
        "posts/group_list.html",
        json!({
            "group": listing.group,
            "page_obj": listing.page,
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/group/{slug}/", get(group_list))
}
