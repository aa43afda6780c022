mod error;
mod image;
mod task;
mod tree;

pub use error::DomainError;
pub use image::{is_image_file, ALLOWED_IMAGE_EXTENSIONS};
pub use task::{Rating, Task, TaskName, TaskStatus, TaskSummary};
pub use tree::DirectoryNode;
