use crate::cli::commands::parse_filter;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        user,
        from,
        to,
        force,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;
        let filter = parse_filter(*user, from.as_ref(), to.as_ref())?;
        ExportLogic::export(&mut pool, format, file, &filter, *force)?;
    }
    Ok(())
}
