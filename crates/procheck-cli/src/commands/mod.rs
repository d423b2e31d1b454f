pub mod config;
pub mod export;
pub mod note;
pub mod session;
pub mod stats;
pub mod task;

use procheck_core::{App, SessionSnapshot};

/// Key inside the state document's `ui` bag where the session snapshot
/// lives between invocations. The bag belongs to the presentation layer,
/// which is us.
const SESSION_UI_KEY: &str = "session";

/// Open the app against the default data directory, restoring the
/// persisted session snapshot if one exists.
pub(crate) fn open_app() -> Result<App, Box<dyn std::error::Error>> {
    let mut app = App::open_default()?;
    let snapshot = app
        .state()
        .ui()
        .get(SESSION_UI_KEY)
        .and_then(|v| serde_json::from_value::<SessionSnapshot>(v.clone()).ok())
        .unwrap_or_default();
    app.restore(snapshot);
    tracing::debug!(state = ?app.state().path(), "stores opened");
    Ok(app)
}

/// Flush pending writes and persist the session snapshot back into the
/// `ui` bag.
pub(crate) fn save_app(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    app.flush();
    let snapshot = serde_json::to_value(app.snapshot())?;
    app.state_mut().ui_mut()[SESSION_UI_KEY] = snapshot;
    app.state_mut().save();
    Ok(())
}
