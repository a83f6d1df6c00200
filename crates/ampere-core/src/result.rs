//! Result type aliases for the Ampere cache layer.

use crate::AmpereError;

/// A specialized `Result` type for Ampere operations.
pub type AmpereResult<T> = Result<T, AmpereError>;
