//! Configuration view and validation commands: `dealboard config`.

use anyhow::Result;
use std::path::Path;

use dealboard::config::{CONFIG_FILE_NAME, DealboardConfig, DealboardToml, default_locations};

use super::super::ConfigCommands;

pub fn cmd_config(config: &DealboardConfig, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Dealboard Configuration");
            println!("=======================");
            println!();

            match &config.source {
                Some(path) => println!("Config file: {}", path.display()),
                None => {
                    println!("No config file found. Searched:");
                    for path in default_locations() {
                        println!("  - {}", path.display());
                    }
                }
            }
            println!();

            println!("Effective values (with env/CLI overrides):");
            println!("[api]");
            println!("  base_url = \"{}\"", config.base_url());
            println!("  timeout_secs = {}", config.timeout().as_secs());
            println!("[commenter]");
            let commenter = config.commenter();
            println!("  name = \"{}\"", commenter.name);
            if let Some(role) = &commenter.role {
                println!("  role = \"{}\"", role);
            }
            println!("[logging]");
            println!("  level = \"{}\"", config.log_level());
            println!("  format = \"{}\"", config.log_format());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            let warnings = config.validate();
            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            let path = Path::new(CONFIG_FILE_NAME);
            if path.exists() {
                println!("{} already exists", path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            DealboardToml::default().save(path)?;
            println!("Created {}", path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_secs");
            println!("  - [commenter] name, role");
            println!("  - [logging] level, format");
            println!();
        }
    }

    Ok(())
}
