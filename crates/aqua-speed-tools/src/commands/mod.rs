//! CLI command implementations

pub mod interactive;
pub mod list;
pub mod update;
pub mod version;
