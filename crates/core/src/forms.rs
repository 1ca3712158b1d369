//! Form input and field validation.
//!
//! Field errors are reported as [`validator::ValidationErrors`] so that a
//! rejected form can be rendered again with a message next to each field.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

#[allow(clippy::unwrap_used)]
static USERNAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").unwrap());

/// Outcome of a form submission.
#[derive(Debug)]
pub enum Submission<T> {
    /// The form was valid and the record was saved.
    Saved(T),
    /// The form was rejected and nothing was persisted.
    Rejected(ValidationErrors),
}

/// Build a `min_length` error whose message names the minimum.
#[must_use]
pub fn min_length_error(min: usize, actual: usize) -> ValidationError {
    let mut error = ValidationError::new("min_length").with_message(Cow::Owned(format!(
        "Ensure this value has at least {min} characters (it has {actual})."
    )));
    error.add_param(Cow::Borrowed("min"), &min);
    error.add_param(Cow::Borrowed("value"), &actual);
    error
}

/// Build an error for a field with a fixed code and message.
#[must_use]
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Record a `min_length` error on `field` if `value` is too short.
///
/// Length is counted in characters, not bytes.
pub fn check_min_length(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    min: usize,
) {
    let len = value.chars().count();
    if len < min {
        errors.add(field, min_length_error(min, len));
    }
}

/// An uploaded image attached to a post form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File name as sent by the client.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl ImageUpload {
    /// Whether the declared content type is an image type.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Post create/edit form.
#[derive(Debug, Clone, Default)]
pub struct PostForm {
    /// Post body.
    pub text: String,
    /// ID of the selected group; `None` for no group.
    pub group: Option<String>,
    /// Newly uploaded image. `None` keeps the current one when editing.
    pub image: Option<ImageUpload>,
}

impl PostForm {
    /// Normalise raw submitted values. Blank group selections mean "no group".
    #[must_use]
    pub fn new(text: &str, group: Option<&str>, image: Option<ImageUpload>) -> Self {
        Self {
            text: text.trim().to_string(),
            group: group
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(str::to_string),
            image,
        }
    }

    /// Check the fields that need no database lookups.
    #[must_use]
    pub fn check(&self, text_min_len: usize) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        check_min_length(&mut errors, "text", &self.text, text_min_len);

        if let Some(image) = &self.image
            && !image.is_image()
        {
            errors.add(
                "image",
                field_error(
                    "invalid_image",
                    "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
                ),
            );
        }

        errors
    }
}

/// Comment form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentForm {
    /// Comment body.
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    /// Validate against the configured minimum length.
    pub fn check(&self, min_len: usize) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_min_length(&mut errors, "text", self.text.trim(), min_len);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Input for registering an account.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150), custom(function = "validate_username"))]
    #[serde(default)]
    pub username: String,

    #[validate(length(max = 150))]
    pub name: Option<String>,

    #[validate(length(min = 8, max = 128))]
    #[serde(default)]
    pub password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(field_error(
            "invalid_username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_names_minimum() {
        let form = PostForm::new("short", None, None);
        let errors = form.check(10);

        let text_errors = errors.field_errors();
        let error = &text_errors["text"][0];
        assert_eq!(error.code, "min_length");
        assert!(error.message.as_ref().unwrap().contains("at least 10"));
    }

    #[test]
    fn test_length_counts_characters() {
        let form = PostForm::new("пост ёжика", None, None);
        assert_eq!(form.text.chars().count(), 10);
        assert!(form.check(10).is_empty());
    }

    #[test]
    fn test_blank_group_means_none() {
        let form = PostForm::new("Long enough text", Some("  "), None);
        assert!(form.group.is_none());

        let form = PostForm::new("Long enough text", Some("g1"), None);
        assert_eq!(form.group.as_deref(), Some("g1"));
    }

    #[test]
    fn test_non_image_upload_rejected() {
        let upload = ImageUpload {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
        };
        let form = PostForm::new("Long enough text", None, Some(upload));

        let errors = form.check(10);
        assert!(errors.field_errors().contains_key("image"));
        assert!(!errors.field_errors().contains_key("text"));
    }

    #[test]
    fn test_comment_min_length() {
        let short = CommentForm {
            text: "hi".to_string(),
        };
        assert!(short.check(3).is_err());

        let ok = CommentForm {
            text: "hey".to_string(),
        };
        assert!(ok.check(3).is_ok());
    }

    #[test]
    fn test_signup_validation() {
        let input = SignupInput {
            username: "bad name".to_string(),
            name: None,
            password: "longpassword".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));

        let input = SignupInput {
            username: "leo.t".to_string(),
            name: Some("Leo".to_string()),
            password: "short".to_string(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
