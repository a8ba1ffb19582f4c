//! Storage layer for cnx-cli
//!
//! Handles configuration files and credential storage. Uses the OS keyring
//! for bearer tokens and TOML for configuration profiles.

use crate::error::StorageError;

pub mod config;
pub mod credentials;

type Result<T> = std::result::Result<T, StorageError>;
