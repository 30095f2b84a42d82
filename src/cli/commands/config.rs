use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
    } = cmd
    {
        let path = Config::config_file();

        if *print_config {
            println!("📄 Config file: {}\n", path.display());
            if path.exists() {
                println!("{}", fs::read_to_string(&path)?);
            } else {
                warning("No config file found, defaults are in effect.");
            }
        }

        if *check {
            if !path.exists() {
                warning("No config file found. Run `zkattend init` to create one.");
                return Ok(());
            }

            println!("▶ Checking configuration…");
            println!("  database:        {}", cfg.database);
            println!("  device host:     {}", cfg.device_host);
            println!("  device port:     {}", cfg.device_port);
            println!("  timeout (secs):  {}", cfg.device_timeout_secs);
            println!("  force UDP:       {}", cfg.device_force_udp);
            success("Configuration is complete.");
        }
    }
    Ok(())
}
