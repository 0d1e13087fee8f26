//! Collaborators of the command layer: node catalogue, mirror probing and
//! speed-test execution

pub mod mirror_probe;
pub mod nodes;
pub mod runner;
