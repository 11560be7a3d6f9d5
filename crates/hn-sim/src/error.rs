//! Error types for simulation operations.

use thiserror::Error;

/// Errors surfaced by the engine API.
///
/// Nothing here aborts the simulation itself; these tell an external
/// caller that a command or query could not be honored.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown component id: {id}")]
    UnknownComponent { id: String },

    #[error("Component {id} is not a {expected}")]
    WrongCategory { id: String, expected: &'static str },

    #[error("Graph error: {message}")]
    Graph { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<hn_graph::GraphError> for SimError {
    fn from(e: hn_graph::GraphError) -> Self {
        SimError::Graph {
            message: e.to_string(),
        }
    }
}
