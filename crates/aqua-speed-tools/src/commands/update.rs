//! Update command

use anyhow::{Context, Result};
use aqua_update::UpdateOutcome;

use crate::app::App;
use crate::cli::UpdateArgs;
use crate::output;

pub async fn run(args: UpdateArgs, app: &App) -> Result<()> {
    let mut updater = app.updater()?;
    output::info(&format!(
        "Installed aqua-speed version: {}",
        updater.current_version()
    ));

    if args.check {
        let spinner = output::spinner("Checking for updates...");
        let check = updater.check().await;
        spinner.finish_and_clear();
        let check = check.context("Failed to check for updates")?;

        if check.update_available() {
            output::success(&format!("Update available: {}", check.latest.version));
            output::kv("Asset", &check.latest.asset_name);
            output::kv("Download", &check.latest.download_url);
            output::info("Run 'aqua-speed-tools update' to install it");
        } else {
            output::success("Already on the latest version");
        }
        return Ok(());
    }

    match updater
        .check_and_update()
        .await
        .context("Failed to update aqua-speed")?
    {
        UpdateOutcome::UpToDate { version } => {
            output::success(&format!("aqua-speed {} is already the latest version", version));
        }
        UpdateOutcome::Updated {
            from,
            to,
            checksum,
            binary_path,
        } => {
            output::success(&format!("Updated aqua-speed {} -> {}", from, to));
            output::kv("Binary", &binary_path.display().to_string());
            output::kv("SHA-1", &checksum);
        }
    }

    Ok(())
}
