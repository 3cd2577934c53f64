pub mod config;
pub mod error;
pub mod geometry;
pub mod render;
pub mod rng;
pub mod sim;
pub mod tape;
pub mod world;

pub use config::{ClockMode, SimConfig};
pub use error::{ConfigError, RuleCode, RunError, TapeError};
pub use geometry::{overlaps, Rect};
pub use sim::{Character, FrameInput, Run, RunEvent, RunPhase, RunSummary, TickOutcome};
