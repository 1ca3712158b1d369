//! Comment service.

use chrono::Utc;
use sea_orm::Set;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::{
    entities::comment,
    repositories::{CommentRepository, PostRepository},
};

use crate::forms::CommentForm;

/// Comment service for business logic.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    post_repo: PostRepository,
    min_len: usize,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub fn new(comment_repo: CommentRepository, post_repo: PostRepository, min_len: usize) -> Self {
        Self {
            comment_repo,
            post_repo,
            min_len,
            id_gen: IdGenerator::new(),
        }
    }

    /// Add a comment by `author_id` to a post.
    ///
    /// Returns `None` when the form is invalid; the input is dropped and no
    /// error reaches the caller. A missing post is still an error.
    pub async fn add(
        &self,
        author_id: &str,
        post_id: &str,
        form: CommentForm,
    ) -> AppResult<Option<comment::Model>> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if let Err(errors) = form.check(self.min_len) {
            tracing::debug!(post_id = %post.id, author_id = %author_id, errors = %errors, "Dropped invalid comment");
            return Ok(None);
        }

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            post_id: Set(post.id),
            author_id: Set(author_id.to_string()),
            text: Set(form.text.trim().to_string()),
            created: Set(Utc::now().into()),
        };

        let comment = self.comment_repo.create(model).await?;
        tracing::debug!(comment_id = %comment.id, post_id = %comment.post_id, "Comment added");

        Ok(Some(comment))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use yatube_common::AppError;
    use yatube_db::entities::post;

    fn test_post() -> post::Model {
        post::Model {
            id: "p1".to_string(),
            text: "A post long enough".to_string(),
            pub_date: Utc::now().into(),
            author_id: "author".to_string(),
            group_id: None,
            image: None,
        }
    }

    fn service(db: MockDatabase) -> CommentService {
        let db = Arc::new(db.into_connection());
        CommentService::new(
            CommentRepository::new(db.clone()),
            PostRepository::new(db),
            3,
        )
    }

    #[tokio::test]
    async fn test_add_comment() {
        let saved = comment::Model {
            id: "c1".to_string(),
            post_id: "p1".to_string(),
            author_id: "reader".to_string(),
            text: "Nice post".to_string(),
            created: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_post()]])
            .append_query_results([[saved]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        let comment = service(db)
            .add("reader", "p1", CommentForm {
                text: "Nice post".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(comment.unwrap().author_id, "reader");
    }

    #[tokio::test]
    async fn test_short_comment_is_dropped() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[test_post()]]);

        let comment = service(db)
            .add("reader", "p1", CommentForm {
                text: " a ".to_string(),
            })
            .await
            .unwrap();

        assert!(comment.is_none());
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()]);

        let result = service(db)
            .add("reader", "nope", CommentForm {
                text: "Nice post".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::PostNotFound(_))));
    }
}
