use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Component id is empty")]
    EmptyId,

    #[error("Duplicate component id: {id}")]
    DuplicateId { id: String },

    #[error("Unknown component id: {id}")]
    UnknownId { id: String },
}
