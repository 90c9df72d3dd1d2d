//! Typed async client for the Energy Management System backend.
//!
//! One [`EmsClient`] covers both backend deployments: the bare-payload one
//! and the one that wraps every response in a `{success, data, error}`
//! envelope. The mode is chosen once, at construction, through [`Config`].
//! Every call resolves to a typed result or a single uniform
//! [`ClientError`]; the layer never retries and never caches.

pub mod client;
pub mod config;
pub mod error;
pub mod models;

pub use client::EmsClient;
pub use config::{Config, ConfigError};
pub use error::ClientError;
