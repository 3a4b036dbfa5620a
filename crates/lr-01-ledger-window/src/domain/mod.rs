//! Window domain: bucket entity, ring buffer and errors.

pub mod bucket;
pub mod errors;
pub mod window;
