//! Core library for twquery
//!
//! This crate implements the **Functional Core** of twquery, following the
//! Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! - **`twquery_core`** (this crate): translation of predicates into requests,
//!   validation of commands, and decoding of responses. Zero I/O.
//! - **`twquery`**: the HTTP executor, configuration, the `TwitterContext`
//!   that drives queries and commands, and the CLI (the Imperative Shell).
//!
//! Everything here is a pure function of its inputs, so it is tested with
//! fixture strings and no mocking.
//!
//! # Module Organization
//!
//! - [`expression`]: predicate AST (`field("type").eq(..).and(..)`)
//! - [`parameters`]: AND-of-equalities extraction into a [`parameters::ParameterMap`]
//! - [`request`]: the request model handed to the transport
//! - [`wire`]: XML and JSON payloads behind one node interface
//! - [`processor`]: the [`processor::RequestProcessor`] contract and materialization
//! - [`twitter`]: entities, the status/list/search processors, list commands
//! - [`error`]: the shared [`Error`] type
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use twquery_core::expression::field;
//! use twquery_core::processor::RequestProcessor;
//! use twquery_core::twitter::{StatusProcessor, StatusType};
//!
//! let processor = StatusProcessor::new("https://api.twitter.com/1.1/");
//! let expr = field("type").eq(StatusType::Show).and(field("id").eq("123"));
//!
//! let params = processor.parameters(&expr)?;
//! let query = processor.query(&params)?;
//! let request = processor.request_for(&query)?;
//! assert_eq!(request.url(), "https://api.twitter.com/1.1/statuses/show.xml?id=123");
//!
//! // Fixture data instead of HTTP
//! let records = processor.process_results("<status><id>123</id></status>", &query)?;
//! assert_eq!(records[0].id, "123");
//! ```

pub mod error;
pub mod expression;
pub mod parameters;
pub mod processor;
pub mod request;
pub mod twitter;
pub mod wire;

pub use error::{Error, Result};
