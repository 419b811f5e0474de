//! Utility modules shared by the build pipeline.

pub mod log;
pub mod minify;
pub mod slug;
