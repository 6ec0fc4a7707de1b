//! Workflow graph parameterization: schema types, type-inference heuristics,
//! deterministic key generation, and the parse pass that ties them together.
//!
//! Everything here is pure, synchronous, and reentrant.

pub mod heuristics;
pub mod outputs;
pub mod param_key;
pub mod parser;
pub mod schema;

pub use heuristics::{infer_param_type, ParamType};
pub use outputs::output_ports;
pub use param_key::{param_key, sanitize, KeyAllocator};
pub use parser::{
    parse_graph, parse_upload, MappableInput, MappableOutput, OutputNode, OutputPort,
    ParameterDefinition, ParsedWorkflow,
};
pub use schema::{is_connection, GraphNode, WorkflowGraph};
