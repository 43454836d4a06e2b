//! Resource kinds and the registry mapping each kind to its strategies.

pub mod extractors;
mod kind;
mod registry;

pub use kind::{ResourceKind, ResourceParseError, parse_include_list};
pub use registry::{
    Acquisition, DEFAULT_MAX_IDENTIFIER, ExtractFn, ResourceRegistry, ResourceSpec,
};
