//! Interactive menu, shown when no subcommand is given

use anyhow::Result;
use aqua_core::{NodeList, ToolsConfig};
use dialoguer::{Input, Select};
use std::path::Path;

use crate::output;
use crate::services::runner::SpeedTestRunner;

const LOGO: &str = r"    ___                        _____                     __   ______            __
   /   | ____ ___  ______ _   / ___/____  ___  ___  ____/ /  /_  __/___  ____  / /____
  / /| |/ __ `/ / / / __ `/   \__ \/ __ \/ _ \/ _ \/ __  /    / / / __ \/ __ \/ / ___/
 / ___ / /_/ / /_/ / /_/ /   ___/ / /_/ /  __/  __/ /_/ /    / / / /_/ / /_/ / (__  )
/_/  |_\__, /\__,_/\__,_/   /____/ .___/\___/\___/\__,_/    /_/  \____/\____/_/____/
         /_/                    /_/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    List,
    TestOne,
    TestAll,
    Exit,
}

impl MenuItem {
    const ALL: [MenuItem; 4] = [Self::List, Self::TestOne, Self::TestAll, Self::Exit];

    fn label(self) -> &'static str {
        match self {
            Self::List => "List all nodes",
            Self::TestOne => "Test a node",
            Self::TestAll => "Test all nodes",
            Self::Exit => "Exit",
        }
    }
}

pub fn run(nodes: &NodeList, binary: &Path, config: &ToolsConfig) -> Result<()> {
    println!("{}", LOGO);
    output::kv(
        "Repository",
        &format!("https://github.com/{}", config.github.tools_repo),
    );
    output::kv("Version", env!("CARGO_PKG_VERSION"));

    let runner = SpeedTestRunner::new(binary);
    let labels: Vec<&str> = MenuItem::ALL.iter().map(|item| item.label()).collect();

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("Choose an option")
            .items(&labels)
            .default(0)
            .interact()?;

        // Failures are reported and the menu shown again
        let result = match MenuItem::ALL[choice] {
            MenuItem::List => super::list::run(nodes, config),
            MenuItem::TestOne => {
                let target: String = Input::new()
                    .with_prompt("Node ID or number")
                    .interact_text()?;
                super::test::run_one(&runner, nodes, target.trim())
            }
            MenuItem::TestAll => super::test::run_all(&runner, nodes),
            MenuItem::Exit => {
                output::info("Exiting...");
                return Ok(());
            }
        };

        if let Err(e) = result {
            output::error(&format!("{:#}", e));
        }
    }
}
