//! Common utilities and shared types for folio.
//!
//! This crate provides foundational components used across all folio crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers and session tokens via [`IdGenerator`]
//! - **Storage**: Image storage backends (local filesystem, S3-compatible)
//!
//! # Example
//!
//! ```no_run
//! use folio_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on {}:{} ({id})", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{
    LocalStorage, StorageBackend, StorageConfig, StorageService, UploadFolder, UploadedFile,
    build_storage, generate_storage_key,
};
