//! Speed-test execution through the aqua-speed binary

use anyhow::{bail, Context, Result};
use aqua_core::Node;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{error, info};

/// Runs the managed binary against one node at a time
pub struct SpeedTestRunner {
    binary: PathBuf,
}

impl SpeedTestRunner {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// `--thread N --server URL --sn NAME --type TYPE`
    pub fn command_args(node: &Node) -> Vec<String> {
        vec![
            "--thread".to_string(),
            node.threads.to_string(),
            "--server".to_string(),
            node.url.clone(),
            "--sn".to_string(),
            node.name.display().to_string(),
            "--type".to_string(),
            node.kind.clone(),
        ]
    }

    /// Run the test with inherited stdio; a non-zero exit is an error
    pub fn run(&self, node: &Node) -> Result<()> {
        let args = Self::command_args(node);
        info!(
            binary = %self.binary.display(),
            node = %node.id,
            args = ?args,
            "executing speed test"
        );

        let status = Command::new(&self.binary)
            .args(&args)
            .status()
            .with_context(|| format!("Failed to start {}", self.binary.display()))?;

        if !status.success() {
            error!(node = %node.id, status = %status, "speed test failed");
            bail!("Speed test for {} exited with {}", node.id, status);
        }
        Ok(())
    }
}
