use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use picrate_domain::{DirectoryNode, Rating, Task, TaskName, TaskStatus, TaskSummary};
use serde::Serialize;

use crate::{
    AnnotateCommand, ApplicationError, BootstrapQuery, CreateTaskCommand, DirectoryTreeQuery,
    DiscardedTask, FetchImageQuery, FileProbe, ImageScanner, ListTasksQuery, NextImageQuery,
    PathResolver, TaskRepository, TokenCodec,
};

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapView {
    #[serde(rename = "directoryTree")]
    pub directory_tree: Option<DirectoryNode>,
    pub tasks: Vec<TaskSummary>,
    #[serde(rename = "defaultRoot")]
    pub default_root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryTreeView {
    pub root: String,
    pub tree: Option<DirectoryNode>,
}

#[derive(Debug, Clone, Default)]
pub struct TaskListView {
    pub tasks: Vec<TaskSummary>,
    pub discarded: Vec<DiscardedTask>,
}

/// The next image to rate, with everything the caller needs to display and
/// stream it.
#[derive(Debug, Clone, Serialize)]
pub struct ImageHandle {
    pub path: String,
    pub token: String,
    pub name: String,
    pub display_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextImageView {
    pub task: String,
    pub image: Option<ImageHandle>,
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnnotateOutcome {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct ImageContents {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// The task engine. One mutex serializes every operation that touches
/// persisted state, so annotate's load-modify-save is atomic with respect to
/// concurrent requests.
pub struct ApplicationService {
    store: Box<dyn TaskRepository>,
    scanner: Box<dyn ImageScanner>,
    paths: Box<dyn PathResolver>,
    tokens: Box<dyn TokenCodec>,
    files: Box<dyn FileProbe>,
    lock: Mutex<()>,
}

impl ApplicationService {
    pub fn new(
        store: Box<dyn TaskRepository>,
        scanner: Box<dyn ImageScanner>,
        paths: Box<dyn PathResolver>,
        tokens: Box<dyn TokenCodec>,
        files: Box<dyn FileProbe>,
    ) -> Self {
        Self {
            store,
            scanner,
            paths,
            tokens,
            files,
            lock: Mutex::new(()),
        }
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // A panicked request must not wedge every later one.
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn bootstrap(&self, _query: BootstrapQuery) -> Result<BootstrapView, ApplicationError> {
        let listing = {
            let _guard = self.guard();
            self.store.load_all()?
        };
        let default_root = self.paths.normalize_directory("")?;
        let tree = self.scanner.build_tree(&default_root)?;
        Ok(BootstrapView {
            directory_tree: tree,
            tasks: self.summaries_sorted(&listing.tasks),
            default_root,
        })
    }

    pub fn directory_tree(
        &self,
        query: DirectoryTreeQuery,
    ) -> Result<DirectoryTreeView, ApplicationError> {
        let root = self.paths.normalize_directory(&query.path)?;
        if !self.files.is_dir(&root) {
            return Err(ApplicationError::InvalidInput(format!(
                "directory does not exist or is not accessible: {root}"
            )));
        }
        let tree = self.scanner.build_tree(&root)?;
        Ok(DirectoryTreeView { root, tree })
    }

    pub fn list_tasks(&self, _query: ListTasksQuery) -> Result<TaskListView, ApplicationError> {
        let listing = {
            let _guard = self.guard();
            self.store.load_all()?
        };
        Ok(TaskListView {
            tasks: self.summaries_sorted(&listing.tasks),
            discarded: listing.discarded,
        })
    }

    pub fn create_task(&self, command: CreateTaskCommand) -> Result<TaskSummary, ApplicationError> {
        let name = TaskName::new(&command.name)?;
        if command.directories.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "at least one image directory is required".to_string(),
            ));
        }

        // Dedup on the raw inputs, first occurrence wins; the order feeds
        // display-path resolution later so it must be preserved.
        let mut unique: Vec<&String> = Vec::new();
        for raw in &command.directories {
            if !unique.contains(&raw) {
                unique.push(raw);
            }
        }

        let mut validated = Vec::with_capacity(unique.len());
        for raw in unique {
            let directory = self.paths.normalize_directory(raw)?;
            if !self.files.is_dir(&directory) {
                return Err(ApplicationError::InvalidInput(format!(
                    "directory does not exist or is not accessible: {raw}"
                )));
            }
            validated.push(directory);
        }

        let images = self.scanner.collect_images(&validated)?;
        if images.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "no annotatable images in the selected directories".to_string(),
            ));
        }

        let task = Task::new(name.as_str().to_string(), validated, images);
        {
            let _guard = self.guard();
            if self.store.contains(&name) {
                return Err(ApplicationError::Conflict(format!(
                    "a task named {name} already exists"
                )));
            }
            self.store.save(&name, &task)?;
        }
        Ok(self.summarize(&task))
    }

    pub fn next_image(&self, query: NextImageQuery) -> Result<NextImageView, ApplicationError> {
        let name = TaskName::new(&query.task)?;
        let (task, next, summary) = {
            let _guard = self.guard();
            let task = self.store.load(&name)?;
            let next = self.first_unannotated(&task);
            let summary = self.summarize(&task);
            (task, next, summary)
        };

        let image = next.map(|path| ImageHandle {
            token: self.tokens.encode(&path),
            name: file_name_of(&path),
            display_path: compute_display_path(&path, &task.directories),
            path,
        });

        Ok(NextImageView {
            task: task.name,
            image,
            total: summary.total,
            completed: summary.completed,
            remaining: summary.remaining,
        })
    }

    pub fn annotate(&self, command: AnnotateCommand) -> Result<AnnotateOutcome, ApplicationError> {
        let name = TaskName::new(&command.task)?;
        if command.image.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "image path is required".to_string(),
            ));
        }
        let rating = Rating::new(command.rating)?;

        let _guard = self.guard();
        let mut task = self.store.load(&name)?;
        let image = self.paths.normalize_image(&command.image)?;
        if !task.contains_image(&image) {
            return Err(ApplicationError::NotFound(format!(
                "image does not belong to task {name}"
            )));
        }
        if !self.files.is_file(&image) {
            return Err(ApplicationError::NotFound(format!(
                "image file no longer exists: {image}"
            )));
        }
        task.set_rating(image, rating);
        self.store.save(&name, &task)?;
        let summary = self.summarize(&task);
        Ok(AnnotateOutcome {
            completed: summary.completed,
            total: summary.total,
        })
    }

    /// Decodes and authorizes a token against the task's image set. Only a
    /// path that is both a member of the set and currently a file on disk may
    /// be streamed; the token itself grants nothing.
    pub fn authorize_image(&self, query: &FetchImageQuery) -> Result<String, ApplicationError> {
        let name = TaskName::new(&query.task)?;
        let decoded = self.tokens.decode(&query.token)?;
        let path = self.paths.normalize_image(&decoded)?;

        let task = {
            let _guard = self.guard();
            self.store.load(&name)?
        };
        if !task.contains_image(&path) {
            return Err(ApplicationError::NotFound(format!(
                "image does not belong to task {name}"
            )));
        }
        if !self.files.is_file(&path) {
            return Err(ApplicationError::NotFound(format!(
                "image file no longer exists: {path}"
            )));
        }
        Ok(path)
    }

    pub fn fetch_image(&self, query: FetchImageQuery) -> Result<ImageContents, ApplicationError> {
        let path = self.authorize_image(&query)?;
        let bytes = self.files.read_bytes(&path)?;
        Ok(ImageContents { path, bytes })
    }

    /// Recomputes progress against the live filesystem. Images whose backing
    /// file vanished drop out of the counts but stay in the stored list.
    pub fn summarize(&self, task: &Task) -> TaskSummary {
        let existing: Vec<&String> = task
            .images
            .iter()
            .filter(|image| self.files.is_file(image))
            .collect();
        let total = existing.len();
        let completed = existing
            .iter()
            .filter(|image| task.is_annotated(image.as_str()))
            .count();
        let remaining = total.saturating_sub(completed);
        TaskSummary {
            name: task.name.clone(),
            directories: task.directories.clone(),
            total,
            completed,
            remaining,
            status: TaskStatus::from_counts(total, remaining),
        }
    }

    /// Linear scan in stored order, skipping files missing on disk. Re-run on
    /// every call on purpose: there is no cursor to go stale when files are
    /// deleted or annotations appear from outside.
    fn first_unannotated(&self, task: &Task) -> Option<String> {
        task.images
            .iter()
            .filter(|image| self.files.is_file(image))
            .find(|image| !task.is_annotated(image.as_str()))
            .cloned()
    }

    fn summaries_sorted(&self, tasks: &[Task]) -> Vec<TaskSummary> {
        let mut summaries: Vec<TaskSummary> =
            tasks.iter().map(|task| self.summarize(task)).collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

/// Path of `image` relative to the first ancestor in `directories`, joined
/// with forward slashes; bare file name when no directory matches. The list
/// order deciding which ancestor wins is part of the contract.
pub fn compute_display_path(image: &str, directories: &[String]) -> String {
    let image_path = Path::new(image);
    for directory in directories {
        if let Ok(relative) = image_path.strip_prefix(directory) {
            let parts: Vec<&str> = relative.iter().filter_map(|part| part.to_str()).collect();
            if !parts.is_empty() {
                return parts.join("/");
            }
        }
    }
    file_name_of(image)
}

fn file_name_of(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::Mutex;

    use super::*;
    use crate::TaskListing;

    #[derive(Default)]
    struct FakeRepository {
        tasks: Mutex<BTreeMap<String, Task>>,
        discarded: Vec<DiscardedTask>,
    }

    impl FakeRepository {
        fn stored(&self, name: &str) -> Option<Task> {
            self.tasks.lock().unwrap().get(name).cloned()
        }

        fn insert(&self, task: Task) {
            self.tasks.lock().unwrap().insert(task.name.clone(), task);
        }
    }

    impl TaskRepository for FakeRepository {
        fn initialize(&self) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn contains(&self, name: &TaskName) -> bool {
            self.tasks.lock().unwrap().contains_key(name.as_str())
        }

        fn load(&self, name: &TaskName) -> Result<Task, ApplicationError> {
            self.stored(name.as_str())
                .ok_or_else(|| ApplicationError::NotFound(format!("task does not exist: {name}")))
        }

        fn save(&self, name: &TaskName, task: &Task) -> Result<(), ApplicationError> {
            self.tasks
                .lock()
                .unwrap()
                .insert(name.as_str().to_string(), task.clone());
            Ok(())
        }

        fn load_all(&self) -> Result<TaskListing, ApplicationError> {
            Ok(TaskListing {
                tasks: self.tasks.lock().unwrap().values().cloned().collect(),
                discarded: self.discarded.clone(),
            })
        }
    }

    struct FakeScanner {
        images: Vec<String>,
        tree: Option<DirectoryNode>,
    }

    impl ImageScanner for FakeScanner {
        fn collect_images(&self, _directories: &[String]) -> Result<Vec<String>, ApplicationError> {
            Ok(self.images.clone())
        }

        fn build_tree(&self, _base: &str) -> Result<Option<DirectoryNode>, ApplicationError> {
            Ok(self.tree.clone())
        }
    }

    /// Anchors relative inputs under `/root`, like the real resolver anchors
    /// them under the image root.
    struct FakeResolver;

    impl FakeResolver {
        fn anchor(raw: &str) -> String {
            let trimmed = raw.trim();
            if trimmed.starts_with('/') {
                trimmed.to_string()
            } else if trimmed.is_empty() || trimmed == "." {
                "/root".to_string()
            } else {
                format!("/root/{trimmed}")
            }
        }
    }

    impl PathResolver for FakeResolver {
        fn normalize_directory(&self, raw: &str) -> Result<String, ApplicationError> {
            Ok(Self::anchor(raw))
        }

        fn normalize_image(&self, raw: &str) -> Result<String, ApplicationError> {
            Ok(Self::anchor(raw))
        }
    }

    struct FakeCodec;

    impl TokenCodec for FakeCodec {
        fn encode(&self, path: &str) -> String {
            format!("tok:{path}")
        }

        fn decode(&self, token: &str) -> Result<String, ApplicationError> {
            token
                .strip_prefix("tok:")
                .map(str::to_string)
                .ok_or_else(|| ApplicationError::InvalidInput("invalid image token".to_string()))
        }
    }

    #[derive(Default)]
    struct FakeProbe {
        files: Mutex<BTreeSet<String>>,
        dirs: BTreeSet<String>,
    }

    impl FakeProbe {
        fn with_files(files: &[&str], dirs: &[&str]) -> Self {
            Self {
                files: Mutex::new(files.iter().map(|f| f.to_string()).collect()),
                dirs: dirs.iter().map(|d| d.to_string()).collect(),
            }
        }

        fn remove_file(&self, path: &str) {
            self.files.lock().unwrap().remove(path);
        }
    }

    impl FileProbe for FakeProbe {
        fn is_file(&self, path: &str) -> bool {
            self.files.lock().unwrap().contains(path)
        }

        fn is_dir(&self, path: &str) -> bool {
            self.dirs.contains(path)
        }

        fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ApplicationError> {
            if self.is_file(path) {
                Ok(format!("bytes:{path}").into_bytes())
            } else {
                Err(ApplicationError::Io(format!("no such file: {path}")))
            }
        }
    }

    struct Fixture {
        repository: std::sync::Arc<FakeRepository>,
        probe: std::sync::Arc<FakeProbe>,
        service: ApplicationService,
    }

    fn fixture(images: &[&str]) -> Fixture {
        let repository = std::sync::Arc::new(FakeRepository::default());
        let probe = std::sync::Arc::new(FakeProbe::with_files(images, &["/root", "/root/birds"]));
        let scanner = FakeScanner {
            images: images.iter().map(|i| i.to_string()).collect(),
            tree: None,
        };
        let service = ApplicationService::new(
            Box::new(SharedRepository(repository.clone())),
            Box::new(scanner),
            Box::new(FakeResolver),
            Box::new(FakeCodec),
            Box::new(SharedProbe(probe.clone())),
        );
        Fixture {
            repository,
            probe,
            service,
        }
    }

    struct SharedRepository(std::sync::Arc<FakeRepository>);

    impl TaskRepository for SharedRepository {
        fn initialize(&self) -> Result<(), ApplicationError> {
            self.0.initialize()
        }
        fn contains(&self, name: &TaskName) -> bool {
            self.0.contains(name)
        }
        fn load(&self, name: &TaskName) -> Result<Task, ApplicationError> {
            self.0.load(name)
        }
        fn save(&self, name: &TaskName, task: &Task) -> Result<(), ApplicationError> {
            self.0.save(name, task)
        }
        fn load_all(&self) -> Result<TaskListing, ApplicationError> {
            self.0.load_all()
        }
    }

    struct SharedProbe(std::sync::Arc<FakeProbe>);

    impl FileProbe for SharedProbe {
        fn is_file(&self, path: &str) -> bool {
            self.0.is_file(path)
        }
        fn is_dir(&self, path: &str) -> bool {
            self.0.is_dir(path)
        }
        fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ApplicationError> {
            self.0.read_bytes(path)
        }
    }

    #[test]
    fn create_task_collects_and_persists() {
        let fx = fixture(&["/root/birds/a.png", "/root/birds/b.png"]);
        let summary = fx
            .service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        assert_eq!(summary.name, "birds");
        assert_eq!(summary.total, 2);
        assert_eq!(summary.completed, 0);
        assert_eq!(summary.remaining, 2);
        assert_eq!(summary.status, TaskStatus::InProgress);

        let stored = fx.repository.stored("birds").expect("persisted");
        assert_eq!(stored.directories, vec!["/root/birds".to_string()]);
        assert_eq!(stored.images.len(), 2);
        assert!(stored.annotations.is_empty());
    }

    #[test]
    fn create_task_rejects_bad_names() {
        let fx = fixture(&["/root/birds/a.png"]);
        for bad in ["", "   ", "a/b", "a\\b", ".."] {
            let result = fx.service.create_task(CreateTaskCommand {
                name: bad.to_string(),
                directories: vec!["birds".to_string()],
            });
            assert!(
                matches!(result, Err(ApplicationError::Domain(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn create_task_requires_directories() {
        let fx = fixture(&["/root/birds/a.png"]);
        let result = fx.service.create_task(CreateTaskCommand {
            name: "birds".to_string(),
            directories: vec![],
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn create_task_rejects_missing_directory() {
        let fx = fixture(&["/root/birds/a.png"]);
        let result = fx.service.create_task(CreateTaskCommand {
            name: "birds".to_string(),
            directories: vec!["no-such-dir".to_string()],
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn create_task_fails_when_no_images_found() {
        let fx = fixture(&[]);
        let result = fx.service.create_task(CreateTaskCommand {
            name: "birds".to_string(),
            directories: vec!["birds".to_string()],
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn create_task_conflicts_on_duplicate_name() {
        let fx = fixture(&["/root/birds/a.png"]);
        let command = CreateTaskCommand {
            name: "birds".to_string(),
            directories: vec!["birds".to_string()],
        };
        fx.service.create_task(command.clone()).expect("first");
        let second = fx.service.create_task(command);
        assert!(matches!(second, Err(ApplicationError::Conflict(_))));
    }

    #[test]
    fn create_task_dedupes_directories_preserving_order() {
        let fx = fixture(&["/root/birds/a.png"]);
        let summary = fx
            .service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec![
                    "birds".to_string(),
                    ".".to_string(),
                    "birds".to_string(),
                    ".".to_string(),
                ],
            })
            .expect("create");
        assert_eq!(
            summary.directories,
            vec!["/root/birds".to_string(), "/root".to_string()]
        );
    }

    #[test]
    fn next_image_walks_images_in_order() {
        let fx = fixture(&["/root/birds/a.png", "/root/birds/b.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        let first = fx
            .service
            .next_image(NextImageQuery {
                task: "birds".to_string(),
            })
            .expect("next");
        let handle = first.image.expect("has image");
        assert_eq!(handle.path, "/root/birds/a.png");
        assert_eq!(handle.name, "a.png");
        assert_eq!(handle.display_path, "a.png");
        assert_eq!(handle.token, "tok:/root/birds/a.png");

        fx.service
            .annotate(AnnotateCommand {
                task: "birds".to_string(),
                image: "/root/birds/a.png".to_string(),
                rating: 3,
            })
            .expect("annotate a");

        let second = fx
            .service
            .next_image(NextImageQuery {
                task: "birds".to_string(),
            })
            .expect("next");
        assert_eq!(
            second.image.expect("has image").path,
            "/root/birds/b.png"
        );
        assert_eq!(second.completed, 1);
        assert_eq!(second.remaining, 1);

        fx.service
            .annotate(AnnotateCommand {
                task: "birds".to_string(),
                image: "/root/birds/b.png".to_string(),
                rating: 5,
            })
            .expect("annotate b");

        let done = fx
            .service
            .next_image(NextImageQuery {
                task: "birds".to_string(),
            })
            .expect("next");
        assert!(done.image.is_none());
        assert_eq!(done.remaining, 0);

        let listing = fx.service.list_tasks(ListTasksQuery).expect("list");
        assert_eq!(listing.tasks[0].status, TaskStatus::Completed);
    }

    #[test]
    fn next_image_skips_files_missing_on_disk() {
        let fx = fixture(&["/root/birds/a.png", "/root/birds/b.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        fx.probe.remove_file("/root/birds/a.png");
        let next = fx
            .service
            .next_image(NextImageQuery {
                task: "birds".to_string(),
            })
            .expect("next");
        assert_eq!(next.image.expect("image").path, "/root/birds/b.png");
        assert_eq!(next.total, 1);
    }

    #[test]
    fn annotate_rejects_out_of_range_ratings() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        for rating in [0, 6, -1] {
            let result = fx.service.annotate(AnnotateCommand {
                task: "birds".to_string(),
                image: "/root/birds/a.png".to_string(),
                rating,
            });
            assert!(matches!(result, Err(ApplicationError::Domain(_))));
        }
        // The annotation map must be untouched by the failed attempts.
        let stored = fx.repository.stored("birds").expect("stored");
        assert!(stored.annotations.is_empty());
    }

    #[test]
    fn annotate_rejects_foreign_image() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        fx.probe
            .files
            .lock()
            .unwrap()
            .insert("/root/other/x.png".to_string());
        let result = fx.service.annotate(AnnotateCommand {
            task: "birds".to_string(),
            image: "/root/other/x.png".to_string(),
            rating: 3,
        });
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[test]
    fn annotate_rejects_vanished_file() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        fx.probe.remove_file("/root/birds/a.png");
        let result = fx.service.annotate(AnnotateCommand {
            task: "birds".to_string(),
            image: "/root/birds/a.png".to_string(),
            rating: 3,
        });
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[test]
    fn summarize_recomputes_total_from_disk_without_mutating_images() {
        let fx = fixture(&["/root/birds/a.png", "/root/birds/b.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        fx.probe.remove_file("/root/birds/b.png");
        let listing = fx.service.list_tasks(ListTasksQuery).expect("list");
        assert_eq!(listing.tasks[0].total, 1);

        let stored = fx.repository.stored("birds").expect("stored");
        assert_eq!(stored.images.len(), 2, "stored list must not shrink");
    }

    #[test]
    fn summary_arithmetic_holds() {
        let fx = fixture(&["/root/birds/a.png", "/root/birds/b.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");
        fx.service
            .annotate(AnnotateCommand {
                task: "birds".to_string(),
                image: "/root/birds/a.png".to_string(),
                rating: 2,
            })
            .expect("annotate");

        let listing = fx.service.list_tasks(ListTasksQuery).expect("list");
        let summary = &listing.tasks[0];
        assert!(summary.completed <= summary.total);
        assert_eq!(summary.remaining, summary.total - summary.completed);
    }

    #[test]
    fn list_tasks_reports_discarded_entries() {
        let repository = std::sync::Arc::new(FakeRepository {
            tasks: Mutex::new(BTreeMap::new()),
            discarded: vec![DiscardedTask {
                name: "broken".to_string(),
                reason: "corrupt task data: broken".to_string(),
            }],
        });
        let probe = std::sync::Arc::new(FakeProbe::with_files(&[], &["/root"]));
        let service = ApplicationService::new(
            Box::new(SharedRepository(repository)),
            Box::new(FakeScanner {
                images: vec![],
                tree: None,
            }),
            Box::new(FakeResolver),
            Box::new(FakeCodec),
            Box::new(SharedProbe(probe)),
        );

        let listing = service.list_tasks(ListTasksQuery).expect("list");
        assert!(listing.tasks.is_empty());
        assert_eq!(listing.discarded.len(), 1);
        assert_eq!(listing.discarded[0].name, "broken");
    }

    #[test]
    fn authorize_rejects_paths_outside_the_task() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        // The file exists on disk but is not part of the task.
        fx.probe
            .files
            .lock()
            .unwrap()
            .insert("/root/secret.png".to_string());
        let result = fx.service.fetch_image(FetchImageQuery {
            task: "birds".to_string(),
            token: "tok:/root/secret.png".to_string(),
        });
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[test]
    fn fetch_image_returns_bytes_for_authorized_member() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        let contents = fx
            .service
            .fetch_image(FetchImageQuery {
                task: "birds".to_string(),
                token: "tok:/root/birds/a.png".to_string(),
            })
            .expect("fetch");
        assert_eq!(contents.path, "/root/birds/a.png");
        assert_eq!(contents.bytes, b"bytes:/root/birds/a.png");
    }

    #[test]
    fn fetch_image_rejects_malformed_tokens() {
        let fx = fixture(&["/root/birds/a.png"]);
        fx.service
            .create_task(CreateTaskCommand {
                name: "birds".to_string(),
                directories: vec!["birds".to_string()],
            })
            .expect("create");

        let result = fx.service.fetch_image(FetchImageQuery {
            task: "birds".to_string(),
            token: "garbage".to_string(),
        });
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn display_path_uses_first_matching_directory() {
        let directories = vec!["/root/all".to_string(), "/root/all/sub".to_string()];
        assert_eq!(
            compute_display_path("/root/all/sub/x.png", &directories),
            "sub/x.png"
        );

        let reversed = vec!["/root/all/sub".to_string(), "/root/all".to_string()];
        assert_eq!(
            compute_display_path("/root/all/sub/x.png", &reversed),
            "x.png"
        );
    }

    #[test]
    fn display_path_falls_back_to_file_name() {
        assert_eq!(
            compute_display_path("/elsewhere/x.png", &["/root/all".to_string()]),
            "x.png"
        );
    }
}
