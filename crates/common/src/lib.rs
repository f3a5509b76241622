//! Common utilities and shared types for shoutly.
//!
//! This crate provides foundational components used across all shoutly crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Identity tokens**: Bearer-token codec via [`AuthTokens`] and [`Principal`]
//! - **ID Generation**: ULID ids and order numbers via [`IdGenerator`]
//! - **Storage**: Presigned-URL object storage backends (local, S3-compatible)
//!
//! # Example
//!
//! ```no_run
//! use shoutly_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let order_number = id_gen.generate_order_number();
//!     println!("New order: {}", order_number);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use auth::{AuthTokens, Principal, Role};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::{IdGenerator, is_valid_id};
pub use storage::{
    LocalStorage, SIGNED_URL_TTL_SECS, StorageBackend, StorageConfig, UploadPurpose,
    build_backend, object_key,
};
