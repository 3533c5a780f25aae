//! HTTP surface for video records: listing, search, featured picks,
//! retrieval with view counting, and the write operations.

pub mod handlers;

pub use handlers::{
    create_video, delete_video, featured_videos, get_video, list_videos, search_videos,
    update_video,
};
