//! # aqua-core
//!
//! Core library for aqua-speed-tools providing:
//! - Layered configuration (embedded defaults, user file, environment)
//! - The speed-test node catalogue model and its validation rules
//! - Platform config and install directory resolution

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::ConfigLoader;
pub use error::{Error, Result};
pub use types::{Node, NodeList, ToolsConfig};
pub use utils::get_home_dir;
