//! # Procheck Core Library
//!
//! Core engine for Procheck, an adaptive "are you still on task?"
//! productivity tracker. The library is UI-free by design: a CLI binary
//! (or any other shell) drives it through plain method calls, and every
//! decision point is delivered as a value rather than a callback.
//!
//! ## Architecture
//!
//! - **Event log**: an append-only CSV file is the single source of
//!   truth; statistics are recomputed from it on demand
//! - **Session timer**: a wall-clock state machine the caller ticks
//!   periodically; check-ins and target-reached are explicit suspension
//!   states
//! - **Adaptive policy**: streak-based hysteresis over per-task check-in
//!   intervals
//! - **Stats engine**: day/week/range summaries, per-task breakdowns,
//!   session insights, CSV export
//!
//! ## Key Components
//!
//! - [`App`]: application state owning the stores and the timer
//! - [`SessionTimer`]: the timer state machine
//! - [`StatsEngine`]: log-derived statistics
//! - [`EventLog`]: the append-only store

pub mod adaptive;
pub mod app;
pub mod error;
pub mod event;
pub mod export;
pub mod format;
pub mod log;
pub mod note;
pub mod stats;
pub mod storage;
pub mod timer;

pub use adaptive::{Adaptation, AdaptivePolicy};
pub use app::{now_ms, App, FinishChoice, SessionSnapshot};
pub use error::{ConfigError, CoreError, Result};
pub use event::{Event, EventKind};
pub use log::EventLog;
pub use stats::{DaySummary, HeatLevel, SessionInsights, StatsEngine};
pub use storage::{Config, NotesStore, StateStore, TaskProfile};
pub use timer::{Prompt, SessionOptions, SessionTimer, TimerState};
