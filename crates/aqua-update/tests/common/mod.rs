//! Common test infrastructure for aqua-update tests
//!
//! # Modules
//!
//! - `constants`: Versions, asset names and binary payloads
//! - `builders`: Zip and tar.xz archive builders, release JSON
//! - `mock_server`: Wiremock setup for the releases API and downloads

#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod constants;
pub mod mock_server;

pub use builders::*;
pub use constants::*;
pub use mock_server::*;
