use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use picrate_application::{ApplicationError, ImageScanner};
use picrate_domain::{is_image_file, DirectoryNode};
use walkdir::WalkDir;

use crate::fs::resolve_non_strict;

#[derive(Debug, Default)]
pub struct WalkdirImageScanner;

impl ImageScanner for WalkdirImageScanner {
    fn collect_images(&self, directories: &[String]) -> Result<Vec<String>, ApplicationError> {
        let mut images = BTreeSet::new();
        for directory in directories {
            let base = Path::new(directory);
            if !base.is_dir() {
                continue;
            }
            for entry in WalkDir::new(base).into_iter().filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if !is_image_file(entry.path()) {
                    continue;
                }
                let resolved = entry
                    .path()
                    .canonicalize()
                    .unwrap_or_else(|_| entry.path().to_path_buf());
                images.insert(resolved.to_string_lossy().into_owned());
            }
        }
        Ok(images.into_iter().collect())
    }

    fn build_tree(&self, base: &str) -> Result<Option<DirectoryNode>, ApplicationError> {
        build_node(Path::new(base), String::new())
    }
}

fn build_node(base: &Path, relative: String) -> Result<Option<DirectoryNode>, ApplicationError> {
    if !base.is_dir() {
        return Ok(None);
    }

    let mut entries: Vec<fs::DirEntry> = fs::read_dir(base)
        .map_err(|error| ApplicationError::Io(error.to_string()))?
        .filter_map(Result::ok)
        .collect();
    entries.sort_by_key(|entry| entry.file_name().to_string_lossy().to_lowercase());

    let mut subdirectories = Vec::new();
    let mut image_count = 0;
    let mut direct_image_count = 0;
    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            let entry_name = entry.file_name().to_string_lossy().into_owned();
            let child_relative = if relative.is_empty() {
                entry_name
            } else {
                format!("{relative}/{entry_name}")
            };
            if let Some(child) = build_node(&path, child_relative)? {
                image_count += child.image_count;
                subdirectories.push(child);
            }
        } else if path.is_file() && is_image_file(&path) {
            direct_image_count += 1;
        }
    }
    image_count += direct_image_count;

    if image_count == 0 && subdirectories.is_empty() {
        return Ok(None);
    }

    let resolved = resolve_non_strict(base);
    let absolute_path = resolved.to_string_lossy().into_owned();
    // The scan root has no parent context, so it carries its full path.
    let name = if relative.is_empty() {
        absolute_path.clone()
    } else {
        resolved
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| absolute_path.clone())
    };

    Ok(Some(DirectoryNode {
        name,
        path: relative,
        absolute_path,
        image_count,
        direct_image_count,
        has_subdirectories: !subdirectories.is_empty(),
        subdirectories,
    }))
}
