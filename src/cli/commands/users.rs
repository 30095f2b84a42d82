use crate::cli::parser::{Commands, UserAction};
use crate::config::Config;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{delete_user, get_user, list_users, set_user_fields};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::colors::{GREY, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Users { action } = cmd {
        let pool = DbPool::new(&cfg.database)?;

        match action {
            UserAction::List => {
                let users = list_users(&pool.conn)?;
                if users.is_empty() {
                    println!("No users known yet. Run `zkattend sync` first.");
                    return Ok(());
                }

                println!("{:>8}  {:<24} {:<16} SYNCED", "ID", "NAME", "DEPARTMENT");
                for u in users {
                    let synced = u.synced_at.as_deref().unwrap_or("never");
                    println!(
                        "{:>8}  {:<24} {:<16} {}{}{}",
                        u.user_id,
                        u.display_name(),
                        u.department.as_deref().unwrap_or("--"),
                        GREY,
                        synced,
                        RESET
                    );
                }
            }

            UserAction::Set {
                user_id,
                name,
                department,
            } => {
                set_user_fields(&pool.conn, *user_id, name.as_deref(), department.as_deref())?;
                let _ = ttlog(
                    &pool.conn,
                    "users",
                    &user_id.to_string(),
                    "User fields updated",
                );
                success(format!("User {} updated.", user_id));
            }

            UserAction::Del { user_id } => {
                if get_user(&pool.conn, *user_id)?.is_none() {
                    return Err(AppError::UnknownUser(*user_id));
                }
                delete_user(&pool.conn, *user_id)?;
                let _ = ttlog(
                    &pool.conn,
                    "users",
                    &user_id.to_string(),
                    "User deleted with punches and make-up entries",
                );
                success(format!("User {} deleted.", user_id));
            }
        }
    }
    Ok(())
}
