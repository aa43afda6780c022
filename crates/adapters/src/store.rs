use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use picrate_application::{
    ApplicationError, DiscardedTask, PathResolver, TaskListing, TaskRepository,
};
use picrate_domain::{Rating, Task, TaskName};
use serde::Deserialize;
use serde_json::Value;

const TASK_FILE_EXT: &str = "json";

/// One JSON file per task under the data directory. Writes go through a
/// temporary sibling plus rename, so a reader never sees a half-written
/// task. Loads treat the stored form as untrusted input and re-normalize it
/// on every read.
pub struct JsonTaskStore {
    data_dir: PathBuf,
    paths: Box<dyn PathResolver>,
}

/// Raw persisted shape, before the self-healing pass. Fields with the wrong
/// container type fail parsing outright (`CorruptData`); annotations are
/// taken as loose JSON and coerced value by value instead.
#[derive(Debug, Deserialize)]
struct StoredTask {
    name: Option<String>,
    #[serde(default)]
    directories: Vec<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    annotations: Value,
}

impl JsonTaskStore {
    pub fn new(data_dir: PathBuf, paths: Box<dyn PathResolver>) -> Self {
        Self { data_dir, paths }
    }

    fn task_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.{TASK_FILE_EXT}"))
    }

    fn heal(&self, name: &TaskName, stored: StoredTask) -> Task {
        let mut directories = Vec::with_capacity(stored.directories.len());
        for raw in &stored.directories {
            if let Ok(resolved) = self.paths.normalize_directory(raw) {
                directories.push(resolved);
            }
        }

        let mut images = Vec::with_capacity(stored.images.len());
        for raw in &stored.images {
            if let Ok(resolved) = self.paths.normalize_image(raw) {
                images.push(resolved);
            }
        }

        let mut annotations = BTreeMap::new();
        if let Value::Object(map) = stored.annotations {
            for (key, value) in map {
                let Ok(image) = self.paths.normalize_image(&key) else {
                    continue;
                };
                let Some(rating) = coerce_rating(&value) else {
                    continue;
                };
                annotations.insert(image, rating);
            }
        }
        // Invariant: annotation keys are a subset of the surviving images.
        annotations.retain(|image, _| images.iter().any(|item| item == image));

        let mut task = Task::new(
            stored.name.unwrap_or_else(|| name.as_str().to_string()),
            directories,
            images,
        );
        task.annotations = annotations;
        task
    }
}

fn coerce_rating(value: &Value) -> Option<Rating> {
    let raw = value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v as i64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse::<i64>().ok()))?;
    Rating::new(raw).ok()
}

impl TaskRepository for JsonTaskStore {
    fn initialize(&self) -> Result<(), ApplicationError> {
        fs::create_dir_all(&self.data_dir).map_err(|error| ApplicationError::Io(error.to_string()))
    }

    fn contains(&self, name: &TaskName) -> bool {
        self.task_file(name.as_str()).exists()
    }

    fn load(&self, name: &TaskName) -> Result<Task, ApplicationError> {
        let path = self.task_file(name.as_str());
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(ApplicationError::NotFound(format!(
                    "task does not exist: {name}"
                )));
            }
            Err(error) => return Err(ApplicationError::Io(error.to_string())),
        };
        let stored: StoredTask = serde_json::from_str(&raw)
            .map_err(|error| ApplicationError::CorruptData(format!("{name}: {error}")))?;
        Ok(self.heal(name, stored))
    }

    fn save(&self, name: &TaskName, task: &Task) -> Result<(), ApplicationError> {
        self.initialize()?;
        let path = self.task_file(name.as_str());
        let tmp_path = tmp_sibling(&path);
        let payload = serde_json::to_string_pretty(task)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        fs::write(&tmp_path, payload).map_err(|error| ApplicationError::Io(error.to_string()))?;
        fs::rename(&tmp_path, &path).map_err(|error| ApplicationError::Io(error.to_string()))
    }

    fn load_all(&self) -> Result<TaskListing, ApplicationError> {
        let mut listing = TaskListing::default();
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(listing),
            Err(error) => return Err(ApplicationError::Io(error.to_string())),
        };

        for entry in entries.filter_map(Result::ok) {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(TASK_FILE_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            let name = match TaskName::new(stem) {
                Ok(name) => name,
                Err(error) => {
                    listing.discarded.push(DiscardedTask {
                        name: stem.to_string(),
                        reason: error.to_string(),
                    });
                    continue;
                }
            };
            match self.load(&name) {
                Ok(task) => listing.tasks.push(task),
                Err(
                    error @ (ApplicationError::NotFound(_) | ApplicationError::CorruptData(_)),
                ) => {
                    listing.discarded.push(DiscardedTask {
                        name: stem.to_string(),
                        reason: error.to_string(),
                    });
                }
                Err(error) => return Err(error),
            }
        }
        Ok(listing)
    }
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    file_name.push(".tmp");
    path.with_file_name(file_name)
}
