use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use picrate_application::{ApplicationError, PathResolver};

/// Canonicalizes user-supplied path strings against a fixed image root.
///
/// Relative inputs are anchored under the image root; `~` is expanded to the
/// user's home. Resolution is non-strict: `.`/`..` are cleaned up lexically
/// and symlinks are resolved for the deepest ancestor that actually exists,
/// but a path pointing at nothing is still a valid result.
#[derive(Debug, Clone)]
pub struct ImageRootPaths {
    image_root: PathBuf,
}

impl ImageRootPaths {
    pub fn new(image_root: PathBuf) -> Self {
        Self {
            image_root: resolve_non_strict(&image_root),
        }
    }

    pub fn image_root(&self) -> &Path {
        &self.image_root
    }

    fn anchor(&self, raw: &str, empty_means_root: bool) -> PathBuf {
        let trimmed = raw.trim();
        let candidate = expand_home(trimmed);
        if candidate.is_absolute() {
            return candidate;
        }
        if empty_means_root && (trimmed.is_empty() || trimmed == ".") {
            return self.image_root.clone();
        }
        self.image_root.join(candidate)
    }
}

impl PathResolver for ImageRootPaths {
    fn normalize_directory(&self, raw: &str) -> Result<String, ApplicationError> {
        let resolved = resolve_non_strict(&self.anchor(raw, true));
        Ok(resolved.to_string_lossy().into_owned())
    }

    fn normalize_image(&self, raw: &str) -> Result<String, ApplicationError> {
        let resolved = resolve_non_strict(&self.anchor(raw, false));
        Ok(resolved.to_string_lossy().into_owned())
    }
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

/// Resolves as much of `path` as exists through the filesystem (symlinks
/// included) and keeps the rest lexical, so nonexistent paths still
/// normalize instead of erroring.
pub(crate) fn resolve_non_strict(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let cleaned = clean_components(&absolute);

    let mut ancestor = cleaned.clone();
    let mut missing: Vec<OsString> = Vec::new();
    loop {
        match std::fs::canonicalize(&ancestor) {
            Ok(resolved) => {
                let mut result = resolved;
                for part in missing.iter().rev() {
                    result.push(part);
                }
                return result;
            }
            Err(_) => {
                let Some(name) = ancestor.file_name().map(|name| name.to_os_string()) else {
                    return cleaned;
                };
                missing.push(name);
                if !ancestor.pop() {
                    return cleaned;
                }
            }
        }
    }
}

fn clean_components(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                cleaned.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                // Popping past the root is a no-op, like `/..` -> `/`.
                cleaned.pop();
            }
        }
    }
    cleaned
}
