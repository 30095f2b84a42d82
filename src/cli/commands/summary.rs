use crate::cli::commands::parse_filter;
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::summary::SummaryLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::day_summary::DaySummary;
use crate::utils::colors::{GREY, RESET, color_for_makeup, color_for_total};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Summary {
        user,
        from,
        to,
        json,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;
        let filter = parse_filter(*user, from.as_ref(), to.as_ref())?;
        let rows = SummaryLogic::summarize(&mut pool, &filter)?;

        if *json {
            let text = serde_json::to_string_pretty(&rows)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{text}");
            return Ok(());
        }

        if rows.is_empty() {
            println!("No attendance data for the selected filter.");
            return Ok(());
        }

        print_table(&rows);
    }
    Ok(())
}

fn print_table(rows: &[DaySummary]) {
    println!(
        "{:<12} {:>8} {:<20} {:>9} {:>9} {:>9} {:>9}  NOTE",
        "DATE", "USER", "NAME", "FIRST", "LAST", "WORKED", "TOTAL"
    );

    for r in rows {
        let first = r
            .first_punch
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());
        let last = r
            .last_punch
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "-".into());

        // Single-punch and punch-less days read as zero; flag them so the
        // operator knows a badge swipe is probably missing.
        let flag = if r.missing_pair() && r.first_punch.is_some() {
            " (!)"
        } else {
            ""
        };

        let name = r.name.as_deref().unwrap_or("-");
        let note = match (&r.makeup_note, r.makeup_hours != 0.0) {
            (Some(n), _) => format!(
                "{}{:+.2}h{} {}",
                color_for_makeup(r.makeup_hours),
                r.makeup_hours,
                RESET,
                n
            ),
            (None, true) => format!(
                "{}{:+.2}h{}",
                color_for_makeup(r.makeup_hours),
                r.makeup_hours,
                RESET
            ),
            (None, false) => String::new(),
        };

        println!(
            "{:<12} {:>8} {:<20} {}{:>9}{} {}{:>9}{} {:>9.2} {}{:>9.2}{}  {}{}",
            r.date.to_string(),
            r.user_id,
            truncate(name, 20),
            GREY,
            first,
            RESET,
            GREY,
            last,
            RESET,
            r.worked_hours,
            color_for_total(r.total_hours),
            r.total_hours,
            RESET,
            note,
            flag
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
