#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime};
use std::env;
use std::fs;
use std::path::PathBuf;

use zkattend::db::initialize::init_db;
use zkattend::db::pool::DbPool;
use zkattend::device::{DeviceClient, DeviceConfig, DeviceInfo, RawPunch, RawUser};
use zkattend::errors::{AppError, AppResult};

pub fn zka() -> Command {
    cargo_bin_cmd!("zkattend")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_zkattend.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Open a pool on a fresh temp DB with the schema in place.
pub fn open_pool(name: &str) -> DbPool {
    let db_path = setup_test_db(name);
    let pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    pool
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

pub fn ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").expect("valid timestamp")
}

pub fn device_cfg() -> DeviceConfig {
    DeviceConfig {
        host: "127.0.0.1".to_string(),
        port: 4370,
        password: 0,
        timeout_secs: 1,
        force_udp: false,
    }
}

/// Canned terminal: hands out a fixed roster and punch log. Can refuse the
/// probe outright, or accept the connection and then fail only the punch
/// read, like a device dropping the link mid-sync.
pub struct ScriptedDevice {
    pub reachable: bool,
    pub punch_read_fails: bool,
    pub roster: Vec<RawUser>,
    pub punches: Vec<RawPunch>,
}

impl ScriptedDevice {
    pub fn new(roster: Vec<RawUser>, punches: Vec<RawPunch>) -> Self {
        Self {
            reachable: true,
            punch_read_fails: false,
            roster,
            punches,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            punch_read_fails: false,
            roster: Vec::new(),
            punches: Vec::new(),
        }
    }

    /// Probe and roster read succeed; the punch read drops the connection.
    pub fn with_failing_punch_read(roster: Vec<RawUser>) -> Self {
        Self {
            reachable: true,
            punch_read_fails: true,
            roster,
            punches: Vec::new(),
        }
    }
}

impl DeviceClient for ScriptedDevice {
    fn probe(&self, _cfg: &DeviceConfig) -> AppResult<DeviceInfo> {
        if !self.reachable {
            return Err(AppError::Connection("connection refused".to_string()));
        }
        Ok(DeviceInfo {
            firmware: "Ver 6.60".to_string(),
            serial: "TEST0001".to_string(),
        })
    }

    fn fetch_roster(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawUser>> {
        self.probe(cfg)?;
        Ok(self.roster.clone())
    }

    fn fetch_punches(&self, cfg: &DeviceConfig) -> AppResult<Vec<RawPunch>> {
        self.probe(cfg)?;
        if self.punch_read_fails {
            return Err(AppError::Connection(
                "device closed the data stream early".to_string(),
            ));
        }
        Ok(self.punches.clone())
    }
}

pub fn raw_user(user_id: i64, name: Option<&str>) -> RawUser {
    RawUser {
        user_id,
        name: name.map(|s| s.to_string()),
    }
}

pub fn raw_punch(user_id: i64, timestamp: &str) -> RawPunch {
    RawPunch {
        user_id,
        timestamp: ts(timestamp),
        punch_type: 0,
        verify_method: 1,
    }
}
