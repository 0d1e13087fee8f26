//! Shared constants for test infrastructure

pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_2_0: &str = "1.2.0";
pub const TAG_V1_2_0: &str = "v1.2.0";

pub const BINARY_PREFIX: &str = "aqua-speed";
pub const LINUX_BINARY: &str = "aqua-speed-linux-x64";
pub const WINDOWS_BINARY: &str = "aqua-speed-windows-x64.exe";

pub const LINUX_ASSET: &str = "aqua-speed-linux-x64_v1.2.0.tar.xz";
pub const WINDOWS_ASSET: &str = "aqua-speed-windows-x64_v1.2.0.zip";
pub const CHECKSUMS_ASSET: &str = "checksums.txt";

pub const LATEST_RELEASE_PATH: &str = "/repos/alice39s/aqua-speed/releases/latest";

pub const BINARY_CONTENT: &[u8] = b"#!/bin/sh\necho aqua-speed 1.2.0\n";
pub const README_CONTENT: &[u8] = b"# aqua-speed\n";
