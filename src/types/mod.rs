//! Type definitions module.
//!
//! Contains shared types used across the application.

pub mod feed;
pub mod oracle;

pub use feed::*;
pub use oracle::*;
