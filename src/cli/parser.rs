use crate::export::ExportFormat;
use clap::{Args, Parser, Subcommand};

/// Command-line interface definition for zkattend
/// CLI application to sync ZKTeco attendance terminals into SQLite
#[derive(Parser)]
#[command(
    name = "zkattend",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sync punch logs from ZKTeco attendance terminals into SQLite and report worked hours",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Device connection overrides shared by `probe` and `sync`.
/// Anything left unset falls back to `ZK_DEVICE_*` environment variables,
/// then the config file.
#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Device IP address or hostname
    #[arg(long)]
    pub host: Option<String>,

    /// Device port (default 4370)
    #[arg(long)]
    pub port: Option<u16>,

    /// Numeric comm password
    #[arg(long)]
    pub password: Option<u32>,

    /// Connection timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Use UDP instead of TCP
    #[arg(long = "udp")]
    pub force_udp: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Test device connectivity and print firmware/serial
    Probe {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Pull the roster and punch log from the device into the database
    Sync {
        #[command(flatten)]
        device: DeviceArgs,
    },

    /// Browse and edit the local user roster
    Users {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage manual make-up hour entries
    Makeup {
        #[command(subcommand)]
        action: MakeupAction,
    },

    /// Show per-user, per-day attendance summaries
    Summary {
        /// Filter by device user id
        #[arg(long)]
        user: Option<i64>,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Export attendance summaries
    Export {
        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        /// Filter by device user id
        #[arg(long)]
        user: Option<i64>,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List all known users
    List,

    /// Set name/department for a user (creates the row when missing)
    Set {
        user_id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        department: Option<String>,
    },

    /// Delete a user and all related punches and make-up entries
    Del { user_id: i64 },
}

#[derive(Subcommand)]
pub enum MakeupAction {
    /// Create or replace the make-up entry for a user/date
    Set {
        user_id: i64,

        /// Date (YYYY-MM-DD)
        date: String,

        /// Signed hour adjustment (negative = correction)
        #[arg(allow_negative_numbers = true)]
        hours: f64,

        #[arg(long)]
        note: Option<String>,
    },

    /// Remove the make-up entry for a user/date
    Del {
        user_id: i64,

        /// Date (YYYY-MM-DD)
        date: String,
    },

    /// List make-up entries
    List {
        #[arg(long)]
        user: Option<i64>,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,
    },
}
