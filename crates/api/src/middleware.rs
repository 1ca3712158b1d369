//! API middleware.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use sea_orm::DatabaseConnection;
use yatube_common::{AppError, Config, StorageBackend};
use yatube_core::{CommentService, FollowingService, GroupService, PostService, UserService};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};

use crate::page_cache::PageCache;

/// Cookie holding the session token.
pub const SESSION_COOKIE: &str = "session";

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub comment_service: CommentService,
    pub following_service: FollowingService,
    pub group_service: GroupService,
    pub index_cache: PageCache,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: &Config,
        storage: Arc<dyn StorageBackend>,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));

        Self {
            user_service: UserService::new(user_repo.clone()),
            post_service: PostService::new(
                post_repo.clone(),
                user_repo.clone(),
                group_repo.clone(),
                comment_repo.clone(),
                storage,
                &config.content,
            ),
            comment_service: CommentService::new(
                comment_repo,
                post_repo,
                config.content.comment_min_len,
            ),
            following_service: FollowingService::new(follow_repo, user_repo),
            group_service: GroupService::new(group_repo),
            index_cache: PageCache::new(config.content.index_cache_secs),
        }
    }
}

/// Authentication middleware.
///
/// Resolves the session cookie (or a `Bearer` token) to a user and stores
/// it in the request extensions. Unknown tokens leave the request anonymous;
/// any other lookup failure is answered with the error page.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = session_token(&req) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized) => {
                tracing::debug!("Unknown session token");
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

fn session_token(req: &Request<Body>) -> Option<String> {
    let jar = CookieJar::from_headers(req.headers());
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_token_from_cookie() {
        let req = Request::builder()
            .header(header::COOKIE, "theme=dark; session=abc123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&req).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_session_token_from_bearer() {
        let req = Request::builder()
            .header(header::AUTHORIZATION, "Bearer xyz")
            .body(Body::empty())
            .unwrap();
        assert_eq!(session_token(&req).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_no_token() {
        let req = Request::new(Body::empty());
        assert!(session_token(&req).is_none());
    }
}
