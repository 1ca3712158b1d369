//! Post repository.
//!
//! Every listing is ordered newest first: by `pub_date` descending, with the
//! post ID as a tie-breaker so page boundaries are stable.

use std::sync::Arc;

use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};
use yatube_common::{AppError, AppResult, Page, PageRequest};

use super::fetch_page;
use crate::entities::{Post, follow, post};

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    fn newest_first() -> Select<Post> {
        Post::find()
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a post by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All posts.
    pub async fn page_all(
        &self,
        per_page: u64,
        request: PageRequest,
    ) -> AppResult<Page<post::Model>> {
        fetch_page(self.db.as_ref(), Self::newest_first(), per_page, request).await
    }

    /// Posts in one group.
    pub async fn page_by_group(
        &self,
        group_id: &str,
        per_page: u64,
        request: PageRequest,
    ) -> AppResult<Page<post::Model>> {
        let select = Self::newest_first().filter(post::Column::GroupId.eq(group_id));
        fetch_page(self.db.as_ref(), select, per_page, request).await
    }

    /// Posts written by one author.
    pub async fn page_by_author(
        &self,
        author_id: &str,
        per_page: u64,
        request: PageRequest,
    ) -> AppResult<Page<post::Model>> {
        let select = Self::newest_first().filter(post::Column::AuthorId.eq(author_id));
        fetch_page(self.db.as_ref(), select, per_page, request).await
    }

    /// Posts by every author `follower_id` follows.
    pub async fn page_followed_by(
        &self,
        follower_id: &str,
        per_page: u64,
        request: PageRequest,
    ) -> AppResult<Page<post::Model>> {
        let followed = Query::select()
            .column(follow::Column::AuthorId)
            .from(follow::Entity)
            .and_where(follow::Column::FollowerId.eq(follower_id))
            .to_owned();

        let select = Self::newest_first().filter(post::Column::AuthorId.in_subquery(followed));
        fetch_page(self.db.as_ref(), select, per_page, request).await
    }

    /// Count posts written by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
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

    fn create_test_post(id: &str, author_id: &str) -> post::Model {
        post::Model {
            id: id.to_string(),
            text: "Some post text".to_string(),
            pub_date: Utc::now().into(),
            author_id: author_id.to_string(),
            group_id: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<post::Model>::new()])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PostNotFound(id)) if id == "missing"));
    }

    #[tokio::test]
    async fn test_create_post() {
        let post = create_test_post("p1", "user1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[post.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PostRepository::new(db);
        let active = post::ActiveModel {
            id: Set("p1".to_string()),
            text: Set("Some post text".to_string()),
            pub_date: Set(post.pub_date),
            author_id: Set("user1".to_string()),
            group_id: Set(None),
            image: Set(None),
        };

        let created = repo.create(active).await.unwrap();
        assert_eq!(created.id, "p1");
        assert_eq!(created.author_id, "user1");
    }

    #[tokio::test]
    async fn test_feed_query_uses_follow_subquery() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let followed = Query::select()
            .column(follow::Column::AuthorId)
            .from(follow::Entity)
            .and_where(follow::Column::FollowerId.eq("me"))
            .to_owned();
        let posts = PostRepository::newest_first()
            .filter(post::Column::AuthorId.in_subquery(followed))
            .all(&db)
            .await
            .unwrap();
        assert!(posts.is_empty());

        let log = db.into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("IN (SELECT"));
        assert!(sql.contains("follower_id"));
        assert!(sql.contains("DESC"));
    }
}
