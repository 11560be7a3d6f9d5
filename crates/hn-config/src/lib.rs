//! hn-config: network definition file format and engine construction.
//!
//! Loading is a two-stage gate. Stage one is the serde parse, which is the
//! only fatal stage: a document that is not valid YAML/JSON (or does not
//! match the schema shape) returns an error. Stage two is semantic
//! validation, which never aborts: duplicate ids, dangling references and
//! unknown pump kinds are collected as warnings and the engine is built
//! from the valid subset.

pub mod build;
pub mod schema;

pub use build::{BuildReport, BuildWarning, build_engine};
pub use schema::*;

use std::path::Path;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Unsupported config extension: {path}")]
    UnsupportedExtension { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a network definition, dispatching on file extension
/// (`.yaml`/`.yml` or `.json`).
pub fn load(path: &Path) -> ConfigResult<NetworkDef> {
    let content = std::fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
        Some("json") => Ok(serde_json::from_str(&content)?),
        _ => Err(ConfigError::UnsupportedExtension {
            path: path.display().to_string(),
        }),
    }
}

pub fn load_yaml_str(content: &str) -> ConfigResult<NetworkDef> {
    Ok(serde_yaml::from_str(content)?)
}

pub fn load_json_str(content: &str) -> ConfigResult<NetworkDef> {
    Ok(serde_json::from_str(content)?)
}
