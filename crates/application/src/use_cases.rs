#[derive(Debug, Clone, Default)]
pub struct BootstrapQuery;

#[derive(Debug, Clone)]
pub struct DirectoryTreeQuery {
    pub path: String,
}

#[derive(Debug, Clone, Default)]
pub struct ListTasksQuery;

#[derive(Debug, Clone)]
pub struct CreateTaskCommand {
    pub name: String,
    pub directories: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NextImageQuery {
    pub task: String,
}

#[derive(Debug, Clone)]
pub struct AnnotateCommand {
    pub task: String,
    /// Image path, absolute or relative to the image root.
    pub image: String,
    pub rating: i64,
}

#[derive(Debug, Clone)]
pub struct FetchImageQuery {
    pub task: String,
    pub token: String,
}
