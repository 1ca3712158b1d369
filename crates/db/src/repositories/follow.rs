//! Follow repository.

use std::sync::Arc;

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use yatube_common::{AppError, AppResult};

use crate::entities::{Follow, follow};

/// Follow repository for database operations.
#[derive(Clone)]
pub struct FollowRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowRepository {
    /// Create a new follow repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a follow edge by follower and author.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        author_id: &str,
    ) -> AppResult<Option<follow::Model>> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user is following an author.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, author_id).await?.is_some())
    }

    /// Insert a follow edge unless the pair already exists.
    ///
    /// Returns `true` if a new edge was written. Concurrent callers racing on
    /// the same pair are settled by the unique index.
    pub async fn create_if_absent(&self, model: follow::ActiveModel) -> AppResult<bool> {
        let inserted = Follow::insert(model)
            .on_conflict(
                OnConflict::columns([follow::Column::FollowerId, follow::Column::AuthorId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(inserted > 0)
    }

    /// Delete the follow edge for a pair. Returns the number of rows removed.
    pub async fn delete_by_pair(&self, follower_id: &str, author_id: &str) -> AppResult<u64> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::AuthorId.eq(author_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Count followers of an author.
    pub async fn count_followers(&self, author_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count authors a user follows.
    pub async fn count_following(&self, follower_id: &str) -> AppResult<u64> {
        Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn edge() -> follow::ActiveModel {
        follow::ActiveModel {
            id: Set("f1".to_string()),
            follower_id: Set("u1".to_string()),
            author_id: Set("u2".to_string()),
            created_at: Set(Utc::now().into()),
        }
    }

    #[tokio::test]
    async fn test_create_if_absent_reports_insert() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(repo.create_if_absent(edge()).await.unwrap());
        assert!(!repo.create_if_absent(edge()).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_following() {
        let model = follow::Model {
            id: "f1".to_string(),
            follower_id: "u1".to_string(),
            author_id: "u2".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![model], vec![]])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert!(repo.is_following("u1", "u2").await.unwrap());
        assert!(!repo.is_following("u2", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_without_edge() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = FollowRepository::new(db);
        assert_eq!(repo.delete_by_pair("u1", "u2").await.unwrap(), 0);
    }
}
