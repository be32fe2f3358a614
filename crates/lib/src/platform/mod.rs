//! Platform detection and well-known paths.

pub mod os;
pub mod paths;

pub use os::{Os, library_path_var};
