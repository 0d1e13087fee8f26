//! Version command

use anyhow::Result;
use aqua_update::{InstallLayout, InstallRecord, Platform};
use tracing::debug;

use crate::app;
use crate::cli::{Cli, VersionArgs};
use crate::version::VersionInfo;

pub fn run(args: &VersionArgs, cli: &Cli) -> Result<()> {
    let info = VersionInfo::current().with_install_record(installed_record(cli));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());

        match &info.speed_version {
            Some(version) => println!("aqua-speed: {}", version),
            None => println!("aqua-speed: not installed"),
        }
        if let Some(checksum) = &info.speed_checksum {
            println!("SHA-1:      {}", checksum);
        }
    }

    Ok(())
}

/// Install record of the managed binary; `None` when absent or unreadable
fn installed_record(cli: &Cli) -> Option<InstallRecord> {
    let config = match app::load_config(cli) {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "skipping install record lookup");
            return None;
        }
    };
    let dir = app::install_dir(&config).ok()?;
    InstallLayout::for_platform(dir, &config.install.binary_prefix, &Platform::current())
        .read_record()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info_current_is_valid_semver() {
        let info = VersionInfo::current();
        assert!(
            semver_like(&info.version),
            "version should be semver, got: {}",
            info.version
        );
        assert!(info.speed_version.is_none());
    }

    fn semver_like(v: &str) -> bool {
        aqua_update::Version::parse(v).is_ok()
    }

    #[test]
    fn test_version_info_display() {
        let info = VersionInfo {
            version: "3.0.0".to_string(),
            commit: Some("abc1234".to_string()),
            target: None,
            speed_version: None,
            speed_checksum: None,
        };
        assert_eq!(info.display(), "aqua-speed-tools 3.0.0 (abc1234)");
        assert_eq!(format!("{}", info), info.display());
    }

    #[test]
    fn test_with_install_record() {
        let info = VersionInfo::current()
            .with_install_record(Some(InstallRecord::new("1.2.0", "")));
        assert_eq!(info.speed_version.as_deref(), Some("1.2.0"));
        assert!(info.speed_checksum.is_none());

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"speed_version\":\"1.2.0\""));
    }
}
