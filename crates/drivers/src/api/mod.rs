//! HTTP API handlers.

mod error;
mod image;
mod tasks;
mod tree;

pub use error::ApiError;
pub use image::image_bytes;
pub use tasks::{annotate, create_task, list_tasks, next_image};
pub use tree::{bootstrap, directory_tree};
