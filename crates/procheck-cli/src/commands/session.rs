use clap::{Subcommand, ValueEnum};
use procheck_core::format::format_hms;
use procheck_core::{now_ms, App, FinishChoice, Prompt};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a session for a task
    Start {
        task: String,
        /// Target duration in minutes (default from config)
        #[arg(long)]
        target_min: Option<u32>,
    },
    /// Tick the timer and print the current snapshot
    Status,
    /// Stop the session, recording its elapsed time
    Stop,
    /// Cancel the session (never counted as a completed session)
    Cancel,
    /// Start a break; a running session is stopped first
    Break {
        /// Task to attribute the break to when no session is running
        #[arg(long)]
        task: Option<String>,
    },
    /// End the current break
    EndBreak {
        /// Immediately start the next session for the break's task
        #[arg(long)]
        start: bool,
    },
    /// Record a procrastination mark without ending the session
    Procrastinate {
        /// Why did you procrastinate? (short)
        reason: String,
    },
    /// Answer a pending check-in
    Checkin {
        /// Still on task?
        answer: CheckinAnswer,
        /// Why are you off task? (required for a "no" answer)
        #[arg(long)]
        reason: Option<String>,
    },
    /// Resolve a finished session
    Finish { choice: FinishArg },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum CheckinAnswer {
    /// On task
    Yes,
    /// Off task
    No,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FinishArg {
    /// Reset and start a fresh session for the same task
    Continue,
    /// Take a break
    Break,
    /// Log a stop and go idle
    End,
}

impl From<FinishArg> for FinishChoice {
    fn from(arg: FinishArg) -> Self {
        match arg {
            FinishArg::Continue => FinishChoice::Continue,
            FinishArg::Break => FinishChoice::Break,
            FinishArg::End => FinishChoice::End,
        }
    }
}

fn status_json(app: &App) -> serde_json::Value {
    let timer = app.timer();
    serde_json::json!({
        "state": timer.state(),
        "task": timer.task(),
        "elapsed_secs": timer.elapsed_secs(),
        "elapsed": format_hms(timer.elapsed_secs()),
        "interval_min": timer.interval_min(),
        "target_min": timer.options().target_min,
        "checkin_in_secs": timer.checkin_remaining_ms().map(|ms| ms / 1000),
        "break_elapsed_secs": timer.break_elapsed_secs(),
        "prompt": timer.prompt(),
    })
}

fn print_status(app: &App) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(&status_json(app))?);
    Ok(())
}

/// When a decision point is pending, most session commands are refused
/// until it is answered, the same way the prompt dialog blocks them.
fn refuse_for_prompt(app: &App, prompt: Prompt) -> Result<(), Box<dyn std::error::Error>> {
    let hint = match prompt {
        Prompt::CheckIn => "answer with: procheck session checkin <yes|no> [--reason ..]",
        Prompt::SessionFinished => "resolve with: procheck session finish <continue|break|end>",
    };
    print_status(app)?;
    eprintln!("decision pending: {hint}");
    Ok(())
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_app_and_tick()?;
    let now = now_ms();

    match action {
        SessionAction::Start { task, target_min } => {
            if let Some(prompt) = app.timer().prompt() {
                refuse_for_prompt(&app, prompt)?;
            } else {
                if !app.start_session(&task, target_min, now) {
                    eprintln!("not started: task is empty or a session/break is already active");
                }
                print_status(&app)?;
            }
        }
        SessionAction::Status => {
            print_status(&app)?;
        }
        SessionAction::Stop => {
            if let Some(prompt) = app.timer().prompt() {
                refuse_for_prompt(&app, prompt)?;
            } else {
                if !app.stop_session(now) {
                    eprintln!("no running session");
                }
                print_status(&app)?;
            }
        }
        SessionAction::Cancel => {
            if let Some(prompt) = app.timer().prompt() {
                refuse_for_prompt(&app, prompt)?;
            } else {
                if !app.cancel_session(now) {
                    eprintln!("no running session");
                }
                print_status(&app)?;
            }
        }
        SessionAction::Break { task } => {
            if let Some(prompt) = app.timer().prompt() {
                refuse_for_prompt(&app, prompt)?;
            } else {
                if !app.start_break(task.as_deref(), now) {
                    eprintln!("already on break");
                }
                print_status(&app)?;
            }
        }
        SessionAction::EndBreak { start } => {
            let task = app.break_task().to_string();
            if !app.end_break(now) {
                eprintln!("not on break");
            } else if start {
                if task.is_empty() || !app.start_session(&task, None, now) {
                    eprintln!("break ended; no task to restart");
                }
            }
            print_status(&app)?;
        }
        SessionAction::Procrastinate { reason } => {
            if let Some(prompt) = app.timer().prompt() {
                refuse_for_prompt(&app, prompt)?;
            } else {
                if !app.mark_procrastination(Some(&reason), now) {
                    eprintln!("no running session");
                }
                print_status(&app)?;
            }
        }
        SessionAction::Checkin { answer, reason } => {
            let on_task = matches!(answer, CheckinAnswer::Yes);
            if !app.resolve_checkin(on_task, reason.as_deref(), now) {
                eprintln!("no pending check-in (an off-task answer needs --reason)");
            }
            print_status(&app)?;
        }
        SessionAction::Finish { choice } => {
            if !app.resolve_session_finished(choice.into(), now) {
                eprintln!("no pending session-finished decision");
            }
            print_status(&app)?;
        }
    }

    super::save_app(app)
}

fn open_app_and_tick() -> Result<App, Box<dyn std::error::Error>> {
    let mut app = super::open_app()?;
    // One cooperative tick per invocation: accrue elapsed time since the
    // last run and surface any decision point that came due.
    app.tick(now_ms());
    Ok(app)
}
