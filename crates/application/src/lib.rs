mod error;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use ports::{
    DiscardedTask, FileProbe, ImageScanner, PathResolver, TaskListing, TaskRepository, TokenCodec,
};
pub use service::{
    compute_display_path, AnnotateOutcome, ApplicationService, BootstrapView, DirectoryTreeView,
    ImageContents, ImageHandle, NextImageView, TaskListView,
};
pub use use_cases::{
    AnnotateCommand, BootstrapQuery, CreateTaskCommand, DirectoryTreeQuery, FetchImageQuery,
    ListTasksQuery, NextImageQuery,
};
