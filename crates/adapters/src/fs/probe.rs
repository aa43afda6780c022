use std::fs;
use std::path::Path;

use picrate_application::{ApplicationError, FileProbe};

#[derive(Debug, Default)]
pub struct LocalFileProbe;

impl FileProbe for LocalFileProbe {
    fn is_file(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn is_dir(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn read_bytes(&self, path: &str) -> Result<Vec<u8>, ApplicationError> {
        fs::read(path).map_err(|error| ApplicationError::Io(error.to_string()))
    }
}
