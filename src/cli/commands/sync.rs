use crate::cli::commands::resolve_device;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::sync::SyncLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::device::ZkClient;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Sync { device } = cmd {
        let device_cfg = resolve_device(cfg, device);

        let mut pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        println!("🔄 Syncing from {}…", device_cfg.addr());

        let (info, report) = SyncLogic::run(&mut pool, &ZkClient::new(), &device_cfg)?;

        success(format!(
            "Sync completed ({} / fw {}).",
            info.serial, info.firmware
        ));
        println!("  users added:     {}", report.users_added);
        println!("  users unchanged: {}", report.users_unchanged);
        println!("  punches added:   {}", report.punches_added);
        println!("  punches skipped: {}", report.punches_skipped);
    }
    Ok(())
}
