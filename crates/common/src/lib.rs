//! Common utilities and shared types for yatube.
//!
//! This crate provides foundational components used across all yatube crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Page-number slicing via [`Page`] and [`PageRequest`]
//! - **Storage**: Media storage for uploaded post images
//!
//! # Example
//!
//! ```no_run
//! use yatube_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} serves posts at {}", config.server.url, id_gen.generate());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pagination::{Page, PageRequest};
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
