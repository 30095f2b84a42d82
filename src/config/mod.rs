use crate::device::DeviceConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: String,
    #[serde(default = "default_device_host")]
    pub device_host: String,
    #[serde(default = "default_device_port")]
    pub device_port: u16,
    #[serde(default)]
    pub device_password: u32,
    #[serde(default = "default_device_timeout")]
    pub device_timeout_secs: u64,
    #[serde(default)]
    pub device_force_udp: bool,
}

fn default_device_host() -> String {
    "192.168.0.201".to_string()
}
fn default_device_port() -> u16 {
    4370
}
fn default_device_timeout() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            device_host: default_device_host(),
            device_port: default_device_port(),
            device_password: 0,
            device_timeout_secs: default_device_timeout(),
            device_force_udp: false,
        }
    }
}

impl Config {
    /// Return the standard configuration directory depending on the platform
    pub fn config_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("zkattend")
        } else {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".zkattend")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("zkattend.conf")
    }

    /// Return the full path of the SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("zkattend.sqlite")
    }

    /// Load configuration from file, or return defaults if not found
    pub fn load() -> Self {
        let path = Self::config_file();

        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
                Err(_) => Config::default(),
            }
        } else {
            Config::default()
        }
    }

    /// Device settings resolved from the config file, then `ZK_DEVICE_*`
    /// environment variables. CLI flags are merged on top by the caller.
    pub fn device_config(&self) -> DeviceConfig {
        let host = env::var("ZK_DEVICE_IP").unwrap_or_else(|_| self.device_host.clone());
        let port = env::var("ZK_DEVICE_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.device_port);
        let password = env::var("ZK_DEVICE_PASSWORD")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.device_password);
        let timeout_secs = env::var("ZK_DEVICE_TIMEOUT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(self.device_timeout_secs);
        let force_udp = env::var("ZK_DEVICE_FORCE_UDP")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(self.device_force_udp);

        DeviceConfig {
            host,
            port,
            password,
            timeout_secs,
            force_udp,
        }
    }

    /// Initialize configuration and database files
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> io::Result<()> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        // DB name: user provided or default
        let db_path = if let Some(name) = custom_db {
            let p = std::path::Path::new(&name);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        } else {
            Self::database_file()
        };

        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..Config::default()
        };

        // Write config file (skipped in test mode so tests never touch the
        // real user config)
        if !is_test {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| io::Error::other(format!("config serialization failed: {e}")))?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        // Create empty DB file if not exists
        if !db_path.exists() {
            fs::File::create(&db_path)?;
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(())
    }
}
