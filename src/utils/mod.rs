//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code generation and input validation
//! - [`store_timeout`] - Deadlines for store calls

pub mod code_generator;
pub mod store_timeout;
