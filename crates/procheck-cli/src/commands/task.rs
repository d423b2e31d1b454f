use clap::Subcommand;
use procheck_core::now_ms;

#[derive(Subcommand)]
pub enum TaskAction {
    /// List known task profiles
    List,
    /// Manually set the check-in interval for a task (clamped to 3..=30)
    SetInterval { task: String, minutes: u32 },
    /// Set the display color for a task
    Color { task: String, color: String },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = super::open_app()?;

    match action {
        TaskAction::List => {
            println!("{}", serde_json::to_string_pretty(app.state().tasks())?);
        }
        TaskAction::SetInterval { task, minutes } => {
            match app.set_task_interval(&task, minutes, now_ms()) {
                Some(applied) => {
                    println!(
                        "{}",
                        serde_json::json!({ "task": task, "interval_min": applied })
                    );
                }
                None => eprintln!("task name is empty"),
            }
        }
        TaskAction::Color { task, color } => {
            app.set_task_color(&task, &color);
            println!("{}", serde_json::json!({ "task": task, "color": color }));
        }
    }

    super::save_app(app)
}
