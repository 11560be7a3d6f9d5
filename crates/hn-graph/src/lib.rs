//! hn-graph: component model and graph registry for hydronet.
//!
//! Defines the common component shape (id, category tag, declared
//! inputs/outputs, enabled flag), the registry that owns components by id,
//! the per-tick flow-edge map, and reference validation.

pub mod component;
pub mod error;
pub mod flow;
pub mod graph;
pub mod validate;

pub use component::{Category, HasMeta, Meta, DRAIN_SENTINEL, SOURCE_SENTINEL};
pub use error::{GraphError, GraphResult};
pub use flow::FlowMap;
pub use graph::ComponentGraph;
pub use validate::{validate_references, EdgeSide, Finding};
