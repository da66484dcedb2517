use super::ops::{SpaceGroup, SymmetryError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
struct SpaceGroupFile {
    name: String,
    operators: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SpaceGroupLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid operator table in '{path}': {source}")]
    Operator {
        path: String,
        source: SymmetryError,
    },
}

impl SpaceGroup {
    /// Loads a space group from a TOML operator table:
    ///
    /// ```toml
    /// name = "P 21/c"
    /// operators = [
    ///     "x, y, z",
    ///     "-x, y+1/2, -z+1/2",
    ///     "-x, -y, -z",
    ///     "x, -y+1/2, z+1/2",
    /// ]
    /// ```
    pub fn load(path: &Path) -> Result<Self, SpaceGroupLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| SpaceGroupLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: SpaceGroupFile =
            toml::from_str(&content).map_err(|e| SpaceGroupLoadError::Toml {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
        let operators: Vec<&str> = file.operators.iter().map(String::as_str).collect();
        SpaceGroup::from_operators(&file.name, &operators).map_err(|e| {
            SpaceGroupLoadError::Operator {
                path: path.to_string_lossy().to_string(),
                source: e,
            }
        })
    }
}
