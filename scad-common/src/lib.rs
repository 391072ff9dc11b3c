//! # SCAD Common Library
//!
//! Shared code for the Streaming Content Analytics Dashboard:
//! - Catalog model (content types, column names)
//! - Bootstrap configuration loading
//! - Common error type

pub mod catalog;
pub mod config;
pub mod error;

pub use catalog::ContentType;
pub use error::{Error, Result};
