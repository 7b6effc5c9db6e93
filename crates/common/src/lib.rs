//! Common utilities and shared types for tweeter.
//!
//! This crate provides foundational components used across all tweeter crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Cryptography**: Password hashing and session signing key derivation
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Media storage backends for uploaded tweet photos
//!
//! # Example
//!
//! ```no_run
//! use tweeter_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod storage;

pub use config::Config;
pub use crypto::{derive_signing_key, hash_password, verify_password};
pub use error::{AppError, AppResult, FieldErrors};
pub use id::IdGenerator;
pub use storage::{LocalStorage, StorageBackend, UploadedFile, generate_storage_key};
