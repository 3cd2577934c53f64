use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::{RuleCode, RunError};
use crate::geometry::Rect;
use crate::world::LevelLayout;

mod game;
pub mod physics;

use game::Game;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Character {
    Explorer,
    Ninja,
    Fairy,
}

impl Character {
    pub const ALL: [Character; 3] = [Character::Explorer, Character::Ninja, Character::Fairy];

    pub fn id(self) -> u8 {
        match self {
            Self::Explorer => 0,
            Self::Ninja => 1,
            Self::Fairy => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|character| character.id() == id)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Explorer => "explorer",
            Self::Ninja => "ninja",
            Self::Fairy => "fairy",
        }
    }

    pub fn tagline(self) -> &'static str {
        match self {
            Self::Explorer => "Your explorer senses a hidden path nearby.",
            Self::Ninja => "Your ninja moves are silent and quick.",
            Self::Fairy => "Your fairy wings glow softly in the dark.",
        }
    }
}

/// Input snapshot for one tick. Jump is the only action the engine reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInput {
    pub jump: bool,
}

/// The player. `x` is screen space (already scroll-relative), `y` is shared
/// by screen and world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub vel_x: f32,
    pub vel_y: f32,
    pub grounded: bool,
    pub falling: bool,
}

impl Body {
    pub fn spawn(config: &SimConfig) -> Self {
        Self {
            x: config.player_start_x,
            y: config.ground_y() - config.player_height,
            width: config.player_width,
            height: config.player_height,
            vel_x: 0.0,
            vel_y: 0.0,
            grounded: true,
            falling: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Idle,
    Running,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelCause {
    Start,
    Timeout,
    PickupsComplete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    LivesExhausted,
    FinalLevelCleared,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub character: Character,
    pub pickups: u32,
    pub level: u32,
    pub lives: u32,
    pub frame_count: u32,
    /// `None` while the run is still going.
    pub reason: Option<EndReason>,
}

/// Observable state changes, drained by UI adapters after each tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    PickupsChanged { total: u32 },
    LevelChanged { level: u32, cause: LevelCause },
    LivesChanged { lives: u32 },
    TimeChanged { seconds_left: u32 },
    FallStarted { frame: u32 },
    RunEnded { summary: RunSummary },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run in progress; nothing simulated.
    Idle,
    Continue,
    LevelAdvanced { level: u32, cause: LevelCause },
    LifeLost { lives: u32 },
    Ended(RunSummary),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Checkpoint {
    pub frame_count: u32,
    pub rng_state: u32,
    pub level: u32,
    pub lives: u32,
    pub pickups: u32,
    pub seconds_left: u32,
    pub scroll: f32,
    pub body_x: f32,
    pub body_y: f32,
    pub body_vel_y: f32,
    pub grounded: bool,
    pub falling: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame_count: u32,
    pub phase: RunPhase,
    pub character: Character,
    pub level: u32,
    pub lives: u32,
    pub pickups: u32,
    pub speed: f32,
    pub scroll: f32,
    pub seconds_left: u32,
    pub clock_epoch: u32,
    pub body: Body,
    pub layout: LevelLayout,
}

/// Owned simulation context for one player. Drive it with `step` once per
/// frame; read `drain_events` for UI updates and `snapshot` for rendering.
#[derive(Clone)]
pub struct Run {
    game: Game,
}

impl Run {
    pub fn new(config: SimConfig, seed: u32) -> Result<Self, RunError> {
        config.validate()?;
        Ok(Self {
            game: Game::new(config, seed),
        })
    }

    pub fn start_run(&mut self, character: Character) -> Result<(), RunError> {
        self.game.start_run(character)
    }

    pub fn restart_from_game_over(&mut self) -> Result<(), RunError> {
        self.game.restart_from_game_over()
    }

    #[inline]
    pub fn step(&mut self, input: FrameInput) -> TickOutcome {
        self.game.step(input)
    }

    /// Steps a copy first and commits only if the result satisfies every
    /// state invariant.
    pub fn step_checked(&mut self, input: FrameInput) -> Result<TickOutcome, RunError> {
        let mut next = self.game.clone();
        let outcome = next.step(input);
        next.validate_invariants()
            .map_err(|rule| RunError::RuleViolation {
                frame: next.frame_count(),
                rule,
            })?;
        self.game = next;
        Ok(outcome)
    }

    /// One real-time second from an external timer. Returns `None` when the
    /// tick is stale (its epoch predates the last transition) or the run is
    /// not on an external clock.
    pub fn second_elapsed(&mut self, epoch: u32) -> Option<TickOutcome> {
        self.game.second_elapsed(epoch)
    }

    #[inline]
    pub fn clock_epoch(&self) -> u32 {
        self.game.clock_epoch()
    }

    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        self.game.drain_events()
    }

    #[inline]
    pub fn phase(&self) -> RunPhase {
        self.game.phase()
    }

    #[inline]
    pub fn summary(&self) -> RunSummary {
        self.game.summary()
    }

    #[inline]
    pub fn body(&self) -> &Body {
        self.game.body()
    }

    #[inline]
    pub fn layout(&self) -> &LevelLayout {
        self.game.layout()
    }

    #[inline]
    pub fn scroll(&self) -> f32 {
        self.game.scroll()
    }

    #[inline]
    pub fn config(&self) -> &SimConfig {
        self.game.config()
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.game.checkpoint()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }
}

/// Starts a fresh run and feeds it `inputs` in order. Inputs past the end of
/// the run are ignored.
pub fn replay(
    config: SimConfig,
    seed: u32,
    character: Character,
    inputs: &[FrameInput],
) -> Result<RunSummary, RunError> {
    let mut run = Run::new(config, seed)?;
    run.start_run(character)?;

    for input in inputs {
        if let TickOutcome::Ended(summary) = run.step(*input) {
            return Ok(summary);
        }
    }

    Ok(run.summary())
}

pub fn replay_with_checkpoints(
    config: SimConfig,
    seed: u32,
    character: Character,
    inputs: &[FrameInput],
    sample_every: u32,
) -> Result<Vec<Checkpoint>, RunError> {
    let mut run = Run::new(config, seed)?;
    run.start_run(character)?;

    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = inputs.len() as u32;
    let mut checkpoints = vec![run.checkpoint()];

    for (index, input) in inputs.iter().enumerate() {
        let outcome = run.step(*input);
        let frame = (index + 1) as u32;
        let ended = matches!(outcome, TickOutcome::Ended(_));
        if frame % stride == 0 || frame == total_frames || ended {
            checkpoints.push(run.checkpoint());
        }
        if ended {
            break;
        }
    }

    Ok(checkpoints)
}
