use picrate_domain::{DirectoryNode, Task, TaskName};

use crate::ApplicationError;

/// Persistence of tasks, keyed by validated name. Implementations treat the
/// stored form as untrusted: `load` re-normalizes paths and purges
/// annotations down to the surviving image set on every read.
pub trait TaskRepository: Send + Sync {
    /// Makes sure the backing storage exists.
    fn initialize(&self) -> Result<(), ApplicationError>;

    fn contains(&self, name: &TaskName) -> bool;

    /// `NotFound` for a missing task, `CorruptData` for an unparsable one.
    fn load(&self, name: &TaskName) -> Result<Task, ApplicationError>;

    /// Atomic: a concurrent reader never observes a partial task file.
    fn save(&self, name: &TaskName, task: &Task) -> Result<(), ApplicationError>;

    /// Loads every stored task, folding unreadable entries into `discarded`
    /// instead of failing the whole listing.
    fn load_all(&self) -> Result<TaskListing, ApplicationError>;
}

#[derive(Debug, Clone, Default)]
pub struct TaskListing {
    pub tasks: Vec<Task>,
    pub discarded: Vec<DiscardedTask>,
}

/// A task file skipped during listing, with the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedTask {
    pub name: String,
    pub reason: String,
}

pub trait ImageScanner: Send + Sync {
    /// Recursively collects allowed image files under the given normalized
    /// directories. Inputs that are missing or not directories are skipped.
    /// Returns deduplicated absolute paths, sorted lexicographically; that
    /// order is also the annotation order.
    fn collect_images(&self, directories: &[String]) -> Result<Vec<String>, ApplicationError>;

    /// Summarized tree rooted at `base`; `None` when nothing under `base`
    /// holds any images.
    fn build_tree(&self, base: &str) -> Result<Option<DirectoryNode>, ApplicationError>;
}

/// Canonicalizes user-supplied path strings against a fixed image root.
/// Resolution is non-strict: it never fails just because a path does not
/// exist. Directory and image normalization share the algorithm but are kept
/// as two operations because callers reason about them differently.
pub trait PathResolver: Send + Sync {
    fn normalize_directory(&self, raw: &str) -> Result<String, ApplicationError>;

    fn normalize_image(&self, raw: &str) -> Result<String, ApplicationError>;
}

/// Reversible transport-safe encoding of an absolute path. The token is an
/// opaque identifier, not a capability: decoded paths must still be checked
/// against the task's image set before use.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, path: &str) -> String;

    fn decode(&self, token: &str) -> Result<String, ApplicationError>;
}

/// Live filesystem checks. Progress numbers are recomputed against the real
/// disk on every call, so these sit behind a port the tests can fake.
pub trait FileProbe: Send + Sync {
    fn is_file(&self, path: &str) -> bool;

    fn is_dir(&self, path: &str) -> bool;

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ApplicationError>;
}
