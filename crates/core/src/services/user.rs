//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::Set;
use validator::{Validate, ValidationErrors};
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::{entities::user, repositories::UserRepository};

use crate::forms::{SignupInput, Submission, field_error};

/// A signed-in user and the session token identifying them.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: user::Model,
    pub token: String,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and open a session for it.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Submission<Session>> {
        if let Err(errors) = input.validate() {
            return Ok(Submission::Rejected(errors));
        }

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            let mut errors = ValidationErrors::new();
            errors.add(
                "username",
                field_error("unique", "A user with that username already exists."),
            );
            return Ok(Submission::Rejected(errors));
        }

        let password_hash = hash_password(&input.password)?;
        let token = self.id_gen.generate_token();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username),
            name: Set(input.name.filter(|n| !n.trim().is_empty())),
            password_hash: Set(password_hash),
            token: Set(Some(token.clone())),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User registered");

        Ok(Submission::Saved(Session { user, token }))
    }

    /// Check credentials and open a session.
    ///
    /// Returns `None` for an unknown username or a wrong password. An
    /// existing session token is reused so other open sessions stay valid.
    pub async fn signin(&self, username: &str, password: &str) -> AppResult<Option<Session>> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            return Ok(None);
        };

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(username = %username, "Rejected sign-in");
            return Ok(None);
        }

        if let Some(token) = user.token.clone() {
            return Ok(Some(Session { user, token }));
        }

        let token = self.id_gen.generate_token();
        let user = self.user_repo.set_token(&user.id, Some(token.clone())).await?;
        Ok(Some(Session { user, token }))
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// End every session of a user.
    pub async fn logout(&self, user_id: &str) -> AppResult<()> {
        self.user_repo.set_token(user_id, None).await?;
        tracing::debug!(user_id = %user_id, "Session closed");
        Ok(())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(password: &str, token: Option<&str>) -> user::Model {
        user::Model {
            id: "u1".to_string(),
            username: "leo".to_string(),
            name: None,
            password_hash: hash_password(password).unwrap(),
            token: token.map(str::to_string),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_signin_reuses_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("secret-pass", Some("tok"))]]);

        let session = service(db).signin("leo", "secret-pass").await.unwrap().unwrap();
        assert_eq!(session.token, "tok");
        assert_eq!(session.user.username, "leo");
    }

    #[tokio::test]
    async fn test_signin_wrong_password() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("secret-pass", Some("tok"))]]);

        let session = service(db).signin("leo", "guess").await.unwrap();
        assert!(session.is_none());
    }

    #[tokio::test]
    async fn test_signup_taken_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("secret-pass", None)]]);

        let result = service(db)
            .signup(SignupInput {
                username: "leo".to_string(),
                name: None,
                password: "another-pass".to_string(),
            })
            .await
            .unwrap();

        let Submission::Rejected(errors) = result else {
            panic!("taken username must be rejected");
        };
        assert!(errors.field_errors().contains_key("username"));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db).authenticate_by_token("nope").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
