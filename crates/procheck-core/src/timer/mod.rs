mod engine;

pub use engine::{Prompt, SessionOptions, SessionTimer, TimerState};
