pub mod backup;
pub mod config;
pub mod db;
pub mod export;
pub mod init;
pub mod log;
pub mod makeup;
pub mod probe;
pub mod summary;
pub mod sync;
pub mod users;

use crate::cli::parser::DeviceArgs;
use crate::config::Config;
use crate::device::DeviceConfig;
use crate::errors::{AppError, AppResult};
use crate::models::filter::SummaryFilter;
use crate::utils::date::parse_date;

/// Resolve the effective device settings: config file / env defaults with CLI
/// flags layered on top.
pub(crate) fn resolve_device(cfg: &Config, args: &DeviceArgs) -> DeviceConfig {
    let mut device = cfg.device_config();

    if let Some(host) = &args.host {
        device.host = host.clone();
    }
    if let Some(port) = args.port {
        device.port = port;
    }
    if let Some(password) = args.password {
        device.password = password;
    }
    if let Some(timeout) = args.timeout {
        device.timeout_secs = timeout;
    }
    if args.force_udp {
        device.force_udp = true;
    }

    device
}

/// Build and validate a summary filter from CLI strings.
pub(crate) fn parse_filter(
    user: Option<i64>,
    from: Option<&String>,
    to: Option<&String>,
) -> AppResult<SummaryFilter> {
    let date_from = from
        .map(|s| parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())))
        .transpose()?;
    let date_to = to
        .map(|s| parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone())))
        .transpose()?;

    let filter = SummaryFilter {
        user_id: user,
        date_from,
        date_to,
    };
    filter.validate()?;
    Ok(filter)
}
