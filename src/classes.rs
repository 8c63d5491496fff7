//! Class Index - Label Mapping for the Classification Layout
//!
//! The training framework assigns class ids to the subdirectories of
//! `classification/` in sorted name order. This writes the same mapping as
//! `class_names.json` so predictions can be turned back into characters.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CLASS_NAMES_FILE: &str = "class_names.json";

#[derive(Debug, Error)]
pub enum ClassIndexError {
    #[error("Failed to read classification directory {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("No classes found in {0}")]
    Empty(PathBuf),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Class names in class-id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassIndex {
    names: Vec<String>,
}

impl ClassIndex {
    pub fn new(mut names: Vec<String>) -> Self {
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Build from the subdirectories of a `classification/` directory.
    pub fn from_dir(dir: &Path) -> Result<Self, ClassIndexError> {
        let io_err = |e| ClassIndexError::Io(dir.to_path_buf(), e);
        let mut names = vec![];
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_dir() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        if names.is_empty() {
            return Err(ClassIndexError::Empty(dir.to_path_buf()));
        }
        Ok(Self::new(names))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.binary_search_by(|n| n.as_str().cmp(name)).ok()
    }

    /// Character for a class id, via a `unicode_char.json` map.
    pub fn character<'a>(&self, index: usize, unicode_chars: &'a Map<String, Value>) -> Option<&'a str> {
        unicode_chars.get(self.name(index)?)?.as_str()
    }

    pub fn write(&self, dir: &Path) -> Result<PathBuf, ClassIndexError> {
        fs::create_dir_all(dir).map_err(|e| ClassIndexError::Io(dir.to_path_buf(), e))?;
        let path = dir.join(CLASS_NAMES_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)
            .map_err(|e| ClassIndexError::Io(path.clone(), e))?;
        Ok(path)
    }
}

struct IndexToClass<'a>(&'a [String]);
struct ClassToIndex<'a>(&'a [String]);

impl Serialize for IndexToClass<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, name) in self.0.iter().enumerate() {
            map.serialize_entry(&i.to_string(), name)?;
        }
        map.end()
    }
}

impl Serialize for ClassToIndex<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (i, name) in self.0.iter().enumerate() {
            map.serialize_entry(name, &i)?;
        }
        map.end()
    }
}

impl Serialize for ClassIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("index_to_class", &IndexToClass(&self.names))?;
        map.serialize_entry("class_to_index", &ClassToIndex(&self.names))?;
        map.end()
    }
}
