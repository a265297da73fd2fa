//! CLI command entry points

pub mod convert;
pub mod merge;
