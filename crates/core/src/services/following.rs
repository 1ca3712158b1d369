//! Following service.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::{follow, user},
    repositories::{FollowRepository, UserRepository},
};

/// Outcome of a follow request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowResult {
    /// A new edge was created.
    Followed,
    /// The edge already existed; nothing changed.
    AlreadyFollowing,
    /// Users cannot follow themselves; nothing changed.
    OwnProfile,
}

/// Follower and following counts for a profile.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow the user named `username`.
    ///
    /// Idempotent: following an author twice leaves exactly one edge.
    /// Returns the author so callers can redirect to the profile.
    pub async fn follow(
        &self,
        follower_id: &str,
        username: &str,
    ) -> AppResult<(user::Model, FollowResult)> {
        let author = self.user_repo.get_by_username(username).await?;

        if author.id == follower_id {
            return Ok((author, FollowResult::OwnProfile));
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            author_id: Set(author.id.clone()),
            created_at: Set(Utc::now().into()),
        };

        let result = if self.follow_repo.create_if_absent(model).await? {
            tracing::info!(follower_id = %follower_id, author_id = %author.id, "Followed author");
            FollowResult::Followed
        } else {
            FollowResult::AlreadyFollowing
        };

        Ok((author, result))
    }

    /// Stop following the user named `username`. No-op if not following.
    pub async fn unfollow(&self, follower_id: &str, username: &str) -> AppResult<user::Model> {
        let author = self.user_repo.get_by_username(username).await?;

        let removed = self.follow_repo.delete_by_pair(follower_id, &author.id).await?;
        if removed > 0 {
            tracing::info!(follower_id = %follower_id, author_id = %author.id, "Unfollowed author");
        }

        Ok(author)
    }

    /// Check if a user is following an author.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }

    /// Follower and following counts of a user.
    pub async fn counts(&self, user_id: &str) -> AppResult<FollowCounts> {
        Ok(FollowCounts {
            followers: self.follow_repo.count_followers(user_id).await?,
            following: self.follow_repo.count_following(user_id).await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use yatube_common::AppError;

    fn test_user(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            name: None,
            password_hash: String::new(),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> FollowingService {
        let db = Arc::new(db.into_connection());
        FollowingService::new(FollowRepository::new(db.clone()), UserRepository::new(db))
    }

    #[tokio::test]
    async fn test_follow_twice_is_idempotent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("author")], [test_user("author")]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ]);
        let service = service(db);

        let (_, first) = service.follow("reader", "author").await.unwrap();
        let (author, second) = service.follow("reader", "author").await.unwrap();

        assert_eq!(first, FollowResult::Followed);
        assert_eq!(second, FollowResult::AlreadyFollowing);
        assert_eq!(author.username, "author");
    }

    #[tokio::test]
    async fn test_follow_self_is_ignored() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("reader")]]);

        let (_, result) = service(db).follow("reader", "reader").await.unwrap();
        assert_eq!(result, FollowResult::OwnProfile);
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db).follow("reader", "ghost").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_unfollow_without_edge_is_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("author")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);

        let author = service(db).unfollow("reader", "author").await.unwrap();
        assert_eq!(author.id, "author");
    }
}
