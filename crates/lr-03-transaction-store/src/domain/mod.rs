//! # Domain Layer
//!
//! Stored transaction entity and store errors.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
