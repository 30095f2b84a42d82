//! Device client adapter.
//!
//! The terminal is an external collaborator reached over a proprietary binary
//! protocol. The rest of the application only sees the `DeviceClient` trait
//! and the plain data shapes below, so the reconciler can be exercised with a
//! scripted fake producing canned rosters and punch logs.

pub mod zk;

use crate::errors::AppResult;
use chrono::NaiveDateTime;
use std::time::Duration;

pub use zk::ZkClient;

/// Connection settings for one terminal.
///
/// Resolved from config-file defaults, `ZK_DEVICE_*` environment variables
/// and CLI flags — always passed in explicitly, never ambient state.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    pub password: u32,
    pub timeout_secs: u64,
    pub force_udp: bool,
}

impl DeviceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Identity metadata returned by a connectivity probe.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub firmware: String,
    pub serial: String,
}

/// One enrolled user as reported by the terminal.
#[derive(Debug, Clone)]
pub struct RawUser {
    pub user_id: i64,
    pub name: Option<String>,
}

/// One clock event as reported by the terminal.
#[derive(Debug, Clone)]
pub struct RawPunch {
    pub user_id: i64,
    pub timestamp: NaiveDateTime,
    pub punch_type: i64,
    pub verify_method: i64,
}

/// The adapter contract consumed by the sync reconciler.
///
/// Each call is connection-scoped: one open/close cycle, closed on every exit
/// path — most firmware allows only a handful of concurrent sessions. Any
/// network, timeout or protocol failure surfaces as `AppError::Connection`.
pub trait DeviceClient {
    /// Open and immediately close a connection; must not mutate device state.
    fn probe(&self, cfg: &DeviceConfig) -> AppResult<DeviceInfo>;

    /// Fetch the device's enrolled-user roster.
    fn fetch_roster(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawUser>>;

    /// Fetch the device's punch log. This is the full current log: the
    /// protocol offers no cursor, so de-duplication is the store's job.
    fn fetch_punches(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawPunch>>;
}
