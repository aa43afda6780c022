use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    EmptyTaskName,
    ReservedTaskName(String),
    TaskNameHasSeparator(String),
    RatingOutOfRange(i64),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTaskName => write!(f, "task name must not be empty"),
            Self::ReservedTaskName(name) => write!(f, "task name {name:?} is reserved"),
            Self::TaskNameHasSeparator(name) => {
                write!(f, "task name {name:?} must not contain path separators")
            }
            Self::RatingOutOfRange(value) => {
                write!(f, "rating must be an integer between 1 and 5, got {value}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
