use crate::cli::commands::resolve_device;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::device::{DeviceClient, ZkClient};
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Probe { device } = cmd {
        let device_cfg = resolve_device(cfg, device);

        println!(
            "🔌 Probing {} ({})…",
            device_cfg.addr(),
            if device_cfg.force_udp { "UDP" } else { "TCP" }
        );

        let info = ZkClient::new().probe(&device_cfg)?;

        success("Device reachable.");
        println!("  firmware: {}", info.firmware);
        println!("  serial:   {}", info.serial);
    }
    Ok(())
}
