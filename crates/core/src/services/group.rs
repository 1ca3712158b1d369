//! Group service.
//!
//! Groups are managed by site staff; there is no public endpoint for
//! creating or deleting them.

use std::sync::LazyLock;

use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::group, repositories::GroupRepository};

use crate::forms::field_error;

#[allow(clippy::unwrap_used)]
static SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap());

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 50), custom(function = "validate_slug"))]
    pub slug: String,
    #[serde(default)]
    pub description: String,
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if SLUG_RE.is_match(slug) {
        Ok(())
    } else {
        Err(field_error(
            "invalid_slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        ))
    }
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group. Slugs are unique.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict(format!(
                "Group with slug '{}' already exists",
                input.slug
            )));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Group created");
        Ok(group)
    }

    /// Delete a group. Its posts remain and lose their group.
    pub async fn delete(&self, slug: &str) -> AppResult<()> {
        let group = self.group_repo.get_by_slug(slug).await?;
        self.group_repo.delete(&group.id).await?;
        tracing::info!(group_id = %group.id, slug = %slug, "Group deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> GroupService {
        GroupService::new(GroupRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_slug_validation() {
        let input = CreateGroupInput {
            title: "Cats".to_string(),
            slug: "cats and dogs".to_string(),
            description: String::new(),
        };
        assert!(input.validate().is_err());

        let input = CreateGroupInput {
            title: "Cats".to_string(),
            slug: "cats_and-dogs2".to_string(),
            description: String::new(),
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_duplicate_slug() {
        let existing = group::Model {
            id: "g1".to_string(),
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]);

        let result = service(db)
            .create(CreateGroupInput {
                title: "More cats".to_string(),
                slug: "cats".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_create_invalid_slug_skips_database() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);

        let result = service(db)
            .create(CreateGroupInput {
                title: "Cats".to_string(),
                slug: "no spaces".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
