//! Core business logic for yatube.

pub mod forms;
pub mod services;

pub use forms::{CommentForm, ImageUpload, PostForm, SignupInput, Submission};
pub use services::*;
