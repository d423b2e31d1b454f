use clap::Subcommand;
use procheck_core::event::DAY_FORMAT;
use procheck_core::now_ms;

#[derive(Subcommand)]
pub enum NoteAction {
    /// Set (or clear, with empty text) the note for a day
    Set {
        text: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the note for a day
    Show {
        #[arg(long)]
        date: Option<String>,
    },
    /// List days that have notes
    List,
}

fn today() -> String {
    chrono::Local::now().date_naive().format(DAY_FORMAT).to_string()
}

pub fn run(action: NoteAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::open_app()?;

    match action {
        NoteAction::Set { text, date } => {
            let day = date.unwrap_or_else(today);
            app.set_day_note(&day, &text, now_ms());
        }
        NoteAction::Show { date } => {
            let day = date.unwrap_or_else(today);
            println!("{}", app.day_note(&day).unwrap_or(""));
        }
        NoteAction::List => {
            let days: Vec<&str> = app.notes().days().collect();
            println!("{}", serde_json::to_string_pretty(&days)?);
        }
    }

    // save_app flushes the debounced note write before persisting.
    super::save_app(app)
}
