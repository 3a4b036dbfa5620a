//! # Domain Layer
//!
//! Cursor ordering, stored events, filters and errors. No locking here.

pub mod cursor;
pub mod errors;
pub mod event;
pub mod filter;

pub use cursor::Cursor;
pub use errors::{CursorError, EventStoreError, FilterError};
pub use event::Event;
pub use filter::{EventFilter, SegmentFilter, TopicFilter};
