use serde::Serialize;

/// One scanned directory in the browsable tree. Directories with no images
/// anywhere beneath them are pruned and never materialize as nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryNode {
    /// Basename, except for the scan root which carries its full absolute
    /// path since it has no parent to give it context.
    pub name: String,
    /// `/`-separated path relative to the scan root; empty for the root.
    pub path: String,
    pub absolute_path: String,
    /// Recursive image count, subdirectories included.
    pub image_count: usize,
    /// Images directly in this directory.
    pub direct_image_count: usize,
    pub has_subdirectories: bool,
    /// Qualifying subdirectories, sorted case-insensitively by name.
    pub subdirectories: Vec<DirectoryNode>,
}
