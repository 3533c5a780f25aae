//! Database layer for the video metadata service.
//!
//! Holds the row models, the connection pool wrapper, and every SQL
//! statement the service issues.

pub mod models;
pub mod operations;

pub use models::{SourceRecord, Video, VideoChanges};
pub use operations::{DbOperations, DbPoolStatus, VideoSort};
