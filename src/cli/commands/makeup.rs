use crate::cli::commands::parse_filter;
use crate::cli::parser::{Commands, MakeupAction};
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{delete_makeup, load_makeup, set_makeup};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use crate::utils::colors::{RESET, color_for_makeup};
use crate::utils::date::parse_date;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Makeup { action } = cmd {
        let pool = DbPool::new(&cfg.database)?;

        match action {
            MakeupAction::Set {
                user_id,
                date,
                hours,
                note,
            } => {
                let d = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.clone()))?;
                if !hours.is_finite() {
                    return Err(AppError::InvalidHours(hours.to_string()));
                }

                set_makeup(&pool.conn, *user_id, d, *hours, note.as_deref())?;
                let _ = ttlog(
                    &pool.conn,
                    "makeup",
                    &format!("{}@{}", user_id, d),
                    &format!("Make-up entry set to {:+.2}h", hours),
                );
                success(format!(
                    "Make-up entry for user {} on {} set to {:+.2}h.",
                    user_id, d, hours
                ));
            }

            MakeupAction::Del { user_id, date } => {
                let d = parse_date(date).ok_or_else(|| AppError::InvalidDate(date.clone()))?;

                if delete_makeup(&pool.conn, *user_id, d)? {
                    let _ = ttlog(
                        &pool.conn,
                        "makeup",
                        &format!("{}@{}", user_id, d),
                        "Make-up entry removed",
                    );
                    success(format!(
                        "Make-up entry for user {} on {} removed.",
                        user_id, d
                    ));
                } else {
                    warning(format!("No make-up entry for user {} on {}.", user_id, d));
                }
            }

            MakeupAction::List { user, from, to } => {
                let filter = parse_filter(*user, from.as_ref(), to.as_ref())?;
                let entries = load_makeup(&pool.conn, &filter)?;

                if entries.is_empty() {
                    println!("No make-up entries for the selected filter.");
                    return Ok(());
                }

                println!("{:<12} {:>8} {:>8}  NOTE", "DATE", "USER", "HOURS");
                for e in entries {
                    println!(
                        "{:<12} {:>8} {}{:>+8.2}{}  {}",
                        e.date,
                        e.user_id,
                        color_for_makeup(e.hours),
                        e.hours,
                        RESET,
                        e.note.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }
    Ok(())
}
