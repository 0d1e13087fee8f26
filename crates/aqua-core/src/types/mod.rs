//! Type definitions for aqua-speed-tools

pub mod node;
pub mod tools_config;

pub use node::{GeoInfo, LocalizedText, Node, NodeList, Size};
pub use tools_config::{
    ArchiveConfig, DisplayConfig, DohEndpoint, GitHubConfig, InstallConfig, MirrorConfig,
    NetworkConfig, ToolsConfig,
};
