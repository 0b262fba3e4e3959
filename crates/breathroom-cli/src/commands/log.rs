use breathroom_core::{Config, CsvSessionLog, SessionRecord, SessionStore};
use clap::Subcommand;

#[derive(Subcommand)]
pub enum LogAction {
    /// Most recent sessions, newest first
    List {
        /// Number of sessions to show (defaults to log.recent_count)
        #[arg(short = 'n', long)]
        count: Option<usize>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Totals over the whole log
    Stats,
    /// Print the session log location
    Path,
}

fn print_table(records: &[SessionRecord]) {
    if records.is_empty() {
        println!("No sessions recorded yet.");
        return;
    }
    println!("{:<17} {:<11} {:>6} {:>6}", "DATE", "PATTERN", "CYCLES", "TIME");
    for r in records {
        println!(
            "{:<17} {:<11} {:>6} {:>6}",
            r.date, r.pattern, r.cycles, r.total_seconds
        );
    }
}

pub fn run(action: LogAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let log = CsvSessionLog::new(config.log_path()?);

    match action {
        LogAction::List { count, json } => {
            let n = count.unwrap_or(config.log.recent_count as usize);
            let records = log.recent(n)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                print_table(&records);
            }
        }
        LogAction::Stats => {
            let summary = log.summary()?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        LogAction::Path => {
            println!("{}", log.path().display());
        }
    }
    Ok(())
}
