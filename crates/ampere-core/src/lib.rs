//! # Ampere Core
//!
//! Core types and error definitions shared by the Ampere cache layer.

pub mod error;
pub mod result;

pub use error::*;
pub use result::*;
