//! HTTP endpoints.

mod auth;
mod follow;
mod groups;
mod posts;
mod profile;

use axum::{Router, http::Uri};
use yatube_common::AppError;

use crate::middleware::AppState;

/// Create the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(groups::router())
        .merge(profile::router())
        .merge(follow::router())
        .nest("/auth", auth::router())
        .fallback(not_found)
}

/// Any unrouted path.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Path of a user's profile page.
pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", urlencoding::encode(username))
}

/// Path of a post's detail page.
pub(crate) fn post_url(post_id: &str) -> String {
    format!("/posts/{post_id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(profile_url("leo"), "/profile/leo/");
        assert_eq!(profile_url("leo@home"), "/profile/leo%40home/");
        assert_eq!(post_url("01abc"), "/posts/01abc/");
    }
}
