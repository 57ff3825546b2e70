//! Imperative shell for twquery
//!
//! Owns everything with side effects: configuration from the environment, the
//! HTTP executor, and the [`TwitterContext`] that runs the pure pipeline from
//! `twquery_core` against it.

pub mod config;
pub mod context;
pub mod executor;

pub use config::{ConfigError, TwitterConfig};
pub use context::TwitterContext;
pub use executor::{Executor, HttpExecutor};
pub use twquery_core::{Error, Result};
