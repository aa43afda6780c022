use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::DomainError;

/// Validated task identifier. Doubles as the task's file name stem, so
/// anything that could escape the data directory is rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskName(String);

impl TaskName {
    pub fn new(raw: &str) -> Result<Self, DomainError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyTaskName);
        }
        if name == "." || name == ".." {
            return Err(DomainError::ReservedTaskName(name.to_string()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(DomainError::TaskNameHasSeparator(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A 1-5 star rating bound to one image within one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if !(1..=5).contains(&value) {
            return Err(DomainError::RatingOutOfRange(value));
        }
        Ok(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// A named labeling job over a fixed set of image files.
///
/// `directories` and `images` are absolute, resolved paths and never change
/// after creation; only `annotations` is mutated. Annotations live in a
/// `BTreeMap` so the persisted form has a stable key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub name: String,
    pub directories: Vec<String>,
    pub images: Vec<String>,
    pub annotations: BTreeMap<String, Rating>,
}

impl Task {
    pub fn new(name: String, directories: Vec<String>, images: Vec<String>) -> Self {
        Self {
            name,
            directories,
            images,
            annotations: BTreeMap::new(),
        }
    }

    pub fn contains_image(&self, image: &str) -> bool {
        self.images.iter().any(|item| item == image)
    }

    pub fn is_annotated(&self, image: &str) -> bool {
        self.annotations.contains_key(image)
    }

    /// Last write wins; re-rating an image overwrites the previous value.
    pub fn set_rating(&mut self, image: String, rating: Rating) {
        self.annotations.insert(image, rating);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Empty,
    Completed,
    InProgress,
}

impl TaskStatus {
    pub fn from_counts(total: usize, remaining: usize) -> Self {
        if total == 0 {
            Self::Empty
        } else if remaining == 0 {
            Self::Completed
        } else {
            Self::InProgress
        }
    }
}

/// Progress snapshot for one task. `total` only counts images whose backing
/// file still exists on disk, so it can shrink without the stored image list
/// changing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSummary {
    pub name: String,
    pub directories: Vec<String>,
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    pub status: TaskStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_name_is_trimmed() {
        let name = TaskName::new("  birds  ").expect("valid name");
        assert_eq!(name.as_str(), "birds");
    }

    #[test]
    fn empty_and_whitespace_names_are_rejected() {
        assert_eq!(TaskName::new(""), Err(DomainError::EmptyTaskName));
        assert_eq!(TaskName::new("   "), Err(DomainError::EmptyTaskName));
    }

    #[test]
    fn dot_names_are_reserved() {
        assert!(matches!(
            TaskName::new("."),
            Err(DomainError::ReservedTaskName(_))
        ));
        assert!(matches!(
            TaskName::new(".."),
            Err(DomainError::ReservedTaskName(_))
        ));
    }

    #[test]
    fn names_with_separators_are_rejected() {
        assert!(matches!(
            TaskName::new("a/b"),
            Err(DomainError::TaskNameHasSeparator(_))
        ));
        assert!(matches!(
            TaskName::new("a\\b"),
            Err(DomainError::TaskNameHasSeparator(_))
        ));
    }

    #[test]
    fn rating_must_be_between_one_and_five() {
        assert!(Rating::new(1).is_ok());
        assert!(Rating::new(5).is_ok());
        assert_eq!(Rating::new(0), Err(DomainError::RatingOutOfRange(0)));
        assert_eq!(Rating::new(6), Err(DomainError::RatingOutOfRange(6)));
        assert_eq!(Rating::new(-3), Err(DomainError::RatingOutOfRange(-3)));
    }

    #[test]
    fn re_rating_overwrites() {
        let mut task = Task::new(
            "t".to_string(),
            vec!["/imgs".to_string()],
            vec!["/imgs/a.png".to_string()],
        );
        task.set_rating("/imgs/a.png".to_string(), Rating::new(2).expect("rating"));
        task.set_rating("/imgs/a.png".to_string(), Rating::new(4).expect("rating"));
        assert_eq!(
            task.annotations.get("/imgs/a.png").map(|r| r.value()),
            Some(4)
        );
    }

    #[test]
    fn status_from_counts() {
        assert_eq!(TaskStatus::from_counts(0, 0), TaskStatus::Empty);
        assert_eq!(TaskStatus::from_counts(3, 0), TaskStatus::Completed);
        assert_eq!(TaskStatus::from_counts(3, 2), TaskStatus::InProgress);
    }
}
