use super::physics::{advance, PhysicsStatus};
use super::*;
use crate::config::ClockMode;
use crate::rng::SeededRng;
use crate::world::generate_level;

/// Level countdown. `epoch` changes on every transition so ticks scheduled
/// for an earlier level can be recognised and dropped.
#[derive(Clone, Copy, Debug)]
struct LevelClock {
    epoch: u32,
    seconds_left: u32,
    frames_into_second: u32,
}

impl LevelClock {
    fn restart(&mut self, seconds: u32) {
        self.epoch = self.epoch.wrapping_add(1);
        self.seconds_left = seconds;
        self.frames_into_second = 0;
    }

    fn stop(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.frames_into_second = 0;
    }

    /// Counts one frame; true when a full second of frames has elapsed.
    fn frame(&mut self, frames_per_second: u32) -> bool {
        self.frames_into_second += 1;
        if self.frames_into_second >= frames_per_second {
            self.frames_into_second = 0;
            true
        } else {
            false
        }
    }
}

#[derive(Clone)]
pub(super) struct Game {
    config: SimConfig,
    rng: SeededRng,
    phase: RunPhase,
    character: Character,
    level: u32,
    lives: u32,
    pickups: u32,
    speed: f32,
    scroll: f32,
    body: Body,
    layout: LevelLayout,
    clock: LevelClock,
    frame_count: u32,
    final_summary: Option<RunSummary>,
    events: Vec<RunEvent>,
}

impl Game {
    pub(super) fn new(config: SimConfig, seed: u32) -> Self {
        let body = Body::spawn(&config);
        Self {
            rng: SeededRng::new(seed),
            phase: RunPhase::Idle,
            character: Character::Explorer,
            level: 1,
            lives: config.starting_lives,
            pickups: 0,
            speed: config.base_speed,
            scroll: 0.0,
            body,
            layout: LevelLayout {
                level: 1,
                length: 0.0,
                platforms: Vec::new(),
                hazards: Vec::new(),
                pickups: Vec::new(),
            },
            clock: LevelClock {
                epoch: 0,
                seconds_left: config.level_seconds,
                frames_into_second: 0,
            },
            frame_count: 0,
            final_summary: None,
            events: Vec::new(),
            config,
        }
    }

    #[inline]
    pub(super) fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub(super) fn phase(&self) -> RunPhase {
        self.phase
    }

    #[inline]
    pub(super) fn clock_epoch(&self) -> u32 {
        self.clock.epoch
    }

    #[inline]
    pub(super) fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    pub(super) fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    #[inline]
    pub(super) fn scroll(&self) -> f32 {
        self.scroll
    }

    #[inline]
    pub(super) fn config(&self) -> &SimConfig {
        &self.config
    }

    pub(super) fn drain_events(&mut self) -> Vec<RunEvent> {
        core::mem::take(&mut self.events)
    }

    pub(super) fn summary(&self) -> RunSummary {
        self.final_summary.unwrap_or(RunSummary {
            character: self.character,
            pickups: self.pickups,
            level: self.level,
            lives: self.lives,
            frame_count: self.frame_count,
            reason: None,
        })
    }

    pub(super) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            level: self.level,
            lives: self.lives,
            pickups: self.pickups,
            seconds_left: self.clock.seconds_left,
            scroll: self.scroll,
            body_x: self.body.x,
            body_y: self.body.y,
            body_vel_y: self.body.vel_y,
            grounded: self.body.grounded,
            falling: self.body.falling,
        }
    }

    pub(super) fn world_snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            frame_count: self.frame_count,
            phase: self.phase,
            character: self.character,
            level: self.level,
            lives: self.lives,
            pickups: self.pickups,
            speed: self.speed,
            scroll: self.scroll,
            seconds_left: self.clock.seconds_left,
            clock_epoch: self.clock.epoch,
            body: self.body,
            layout: self.layout.clone(),
        }
    }

    pub(super) fn start_run(&mut self, character: Character) -> Result<(), RunError> {
        if self.phase != RunPhase::Idle {
            return Err(RunError::WrongPhase {
                action: "start a run",
                expected: RunPhase::Idle,
                found: self.phase,
            });
        }

        self.character = character;
        self.level = 1;
        self.lives = self.config.starting_lives;
        self.pickups = 0;
        self.speed = self.config.speed_for_level(1);
        self.frame_count = 0;
        self.final_summary = None;
        self.init_level();
        self.phase = RunPhase::Running;

        tracing::debug!(character = character.name(), "run started");
        self.events.push(RunEvent::PickupsChanged { total: 0 });
        self.events.push(RunEvent::LivesChanged { lives: self.lives });
        self.events.push(RunEvent::LevelChanged {
            level: self.level,
            cause: LevelCause::Start,
        });
        self.push_time_event();
        Ok(())
    }

    pub(super) fn restart_from_game_over(&mut self) -> Result<(), RunError> {
        if self.phase != RunPhase::Ended {
            return Err(RunError::WrongPhase {
                action: "restart",
                expected: RunPhase::Ended,
                found: self.phase,
            });
        }

        self.phase = RunPhase::Idle;
        self.final_summary = None;
        self.events.clear();
        Ok(())
    }

    pub(super) fn step(&mut self, input: FrameInput) -> TickOutcome {
        match self.phase {
            RunPhase::Idle => return TickOutcome::Idle,
            RunPhase::Ended => return TickOutcome::Ended(self.summary()),
            RunPhase::Running => {}
        }

        self.frame_count += 1;

        let outcome = advance(
            &mut self.body,
            &mut self.layout,
            &mut self.scroll,
            self.speed,
            input,
            &self.config,
        );

        if outcome.collected > 0 {
            self.pickups += outcome.collected;
            self.events.push(RunEvent::PickupsChanged {
                total: self.pickups,
            });
        }
        if outcome.fall_started {
            self.events.push(RunEvent::FallStarted {
                frame: self.frame_count,
            });
        }

        match outcome.status {
            PhysicsStatus::FallComplete => return self.lose_life(),
            PhysicsStatus::LevelComplete => return self.advance_level(LevelCause::PickupsComplete),
            PhysicsStatus::Running => {}
        }

        if self.config.clock == ClockMode::Virtual
            && self.clock.frame(self.config.frames_per_second)
        {
            return self.tick_second();
        }

        TickOutcome::Continue
    }

    pub(super) fn second_elapsed(&mut self, epoch: u32) -> Option<TickOutcome> {
        if self.config.clock != ClockMode::External {
            tracing::warn!("ignoring external timer tick: run uses the virtual clock");
            return None;
        }
        if self.phase != RunPhase::Running || epoch != self.clock.epoch {
            tracing::warn!(
                epoch,
                current = self.clock.epoch,
                "ignoring stale level timer tick"
            );
            return None;
        }

        Some(self.tick_second())
    }

    fn tick_second(&mut self) -> TickOutcome {
        self.clock.seconds_left = self.clock.seconds_left.saturating_sub(1);
        self.push_time_event();

        if self.clock.seconds_left == 0 {
            return self.advance_level(LevelCause::Timeout);
        }
        TickOutcome::Continue
    }

    fn init_level(&mut self) {
        self.layout = generate_level(self.level, &self.config, &mut self.rng);
        self.body = Body::spawn(&self.config);
        self.scroll = 0.0;
        self.clock.restart(self.config.level_seconds);
    }

    fn advance_level(&mut self, cause: LevelCause) -> TickOutcome {
        if self.level >= self.config.max_level {
            return self.end_run(EndReason::FinalLevelCleared);
        }

        self.level += 1;
        self.speed = self.config.speed_for_level(self.level);
        self.init_level();

        tracing::debug!(
            level = self.level,
            ?cause,
            speed = self.speed,
            "level advanced"
        );
        self.events.push(RunEvent::LevelChanged {
            level: self.level,
            cause,
        });
        self.push_time_event();
        TickOutcome::LevelAdvanced {
            level: self.level,
            cause,
        }
    }

    fn lose_life(&mut self) -> TickOutcome {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(RunEvent::LivesChanged { lives: self.lives });

        if self.lives == 0 {
            return self.end_run(EndReason::LivesExhausted);
        }

        self.init_level();
        tracing::debug!(lives = self.lives, level = self.level, "life lost");
        self.push_time_event();
        TickOutcome::LifeLost { lives: self.lives }
    }

    fn end_run(&mut self, reason: EndReason) -> TickOutcome {
        self.phase = RunPhase::Ended;
        self.clock.stop();

        let summary = RunSummary {
            character: self.character,
            pickups: self.pickups,
            level: self.level,
            lives: self.lives,
            frame_count: self.frame_count,
            reason: Some(reason),
        };
        self.final_summary = Some(summary);

        tracing::info!(
            pickups = summary.pickups,
            level = summary.level,
            frames = summary.frame_count,
            ?reason,
            "run ended"
        );
        self.events.push(RunEvent::RunEnded { summary });
        TickOutcome::Ended(summary)
    }

    fn push_time_event(&mut self) {
        self.events.push(RunEvent::TimeChanged {
            seconds_left: self.clock.seconds_left,
        });
    }

    pub(super) fn validate_invariants(&self) -> Result<(), RuleCode> {
        if self.lives > self.config.starting_lives {
            return Err(RuleCode::LivesRange);
        }

        let phase_lives_consistent = match self.phase {
            RunPhase::Idle => true,
            RunPhase::Running => self.lives > 0,
            RunPhase::Ended => self.lives == 0 || self.level == self.config.max_level,
        };
        if !phase_lives_consistent {
            return Err(RuleCode::PhaseLivesConsistency);
        }

        let level_in_range = (1..=self.config.max_level).contains(&self.level)
            && self.layout.level == self.level;
        if self.phase != RunPhase::Idle && !level_in_range {
            return Err(RuleCode::LevelRange);
        }

        if self.body.falling && self.body.grounded {
            return Err(RuleCode::BodyFallingGrounded);
        }

        let body_in_bounds = self.body.x.is_finite()
            && self.body.y.is_finite()
            && self.body.x >= 0.0
            && self.body.x <= self.config.scroll_anchor_x();
        if !body_in_bounds {
            return Err(RuleCode::BodyBounds);
        }

        if self.layout.collected_count() as u32 > self.pickups {
            return Err(RuleCode::PickupCountConsistency);
        }

        if !(self.scroll >= 0.0) {
            return Err(RuleCode::ScrollNegative);
        }

        let time_in_range = self.clock.seconds_left <= self.config.level_seconds
            && (self.phase != RunPhase::Running || self.clock.seconds_left > 0);
        if !time_in_range {
            return Err(RuleCode::TimeRange);
        }

        Ok(())
    }
}
