use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Subcommand;
use procheck_core::event::DAY_FORMAT;
use procheck_core::export::export_week_csv;
use procheck_core::stats::{monday_of, StatsEngine};
use procheck_core::{storage, EventLog};

#[derive(Subcommand)]
pub enum ExportAction {
    /// Export the week containing a day (default: the current week)
    Week {
        #[arg(long)]
        anchor: Option<String>,
        /// Output file (default: procheck_week_<start>_to_<end>.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn run(action: ExportAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ExportAction::Week { anchor, out } => {
            let anchor = match anchor {
                Some(s) => NaiveDate::parse_from_str(&s, DAY_FORMAT)?,
                None => chrono::Local::now().date_naive(),
            };

            let mut stats = StatsEngine::new(EventLog::open(storage::log_path()?));
            stats.reload()?;

            let start = monday_of(anchor);
            let end = start + chrono::Duration::days(6);
            let path = out.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "procheck_week_{}_to_{}.csv",
                    start.format(DAY_FORMAT),
                    end.format(DAY_FORMAT)
                ))
            });

            let file = std::fs::File::create(&path)?;
            export_week_csv(&stats, anchor, file)?;
            println!("{}", serde_json::json!({ "saved": path }));
        }
    }
    Ok(())
}
