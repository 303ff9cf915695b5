//! Core data types shared by the loader, the override layer and the resolver

pub mod node;
pub mod path;
pub mod resolved;

pub use node::{ConfigNode, MISSING_MARKER};
pub use path::ConfigPath;
pub use resolved::ResolvedConfig;
