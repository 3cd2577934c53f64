//! Autopilot bots. A bot sees the same snapshot a renderer would and answers
//! with one input per frame.

use skyrun_core::sim::WorldSnapshot;
use skyrun_core::FrameInput;

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput;
}

/// Never presses anything. Useful as a baseline and for timeout runs.
#[derive(Debug, Default)]
pub struct IdleBot;

impl AutopilotBot for IdleBot {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        "never jumps; rides the ground until a hazard or the timer ends the level"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _world: &WorldSnapshot) -> FrameInput {
        FrameInput::default()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct HopperTuning {
    /// Frames of travel ahead of the body in which a hazard edge triggers a jump.
    pub hazard_lead_frames: f32,
    /// Frames of travel ahead in which an overhead pickup triggers a jump.
    pub pickup_lead_frames: f32,
    /// Highest pickup bottom (above the body top) still worth jumping for.
    pub pickup_reach: f32,
}

impl Default for HopperTuning {
    fn default() -> Self {
        Self {
            hazard_lead_frames: 9.0,
            pickup_lead_frames: 14.0,
            pickup_reach: 80.0,
        }
    }
}

/// Jumps over hazards just before reaching them and hops for pickups that
/// hang above the running line.
#[derive(Debug, Default)]
pub struct HopperBot {
    tuning: HopperTuning,
}

impl HopperBot {
    pub fn with_tuning(tuning: HopperTuning) -> Self {
        Self { tuning }
    }

    fn hazard_ahead(&self, world: &WorldSnapshot) -> bool {
        let front = world.body.x + world.body.width + world.scroll;
        let reach = world.speed * self.tuning.hazard_lead_frames;
        world
            .layout
            .hazards
            .iter()
            .any(|hazard| (0.0..=reach).contains(&(hazard.rect.x - front)))
    }

    fn pickup_overhead(&self, world: &WorldSnapshot) -> bool {
        let front = world.body.x + world.body.width + world.scroll;
        let reach = world.speed * self.tuning.pickup_lead_frames;
        let top = world.body.y;
        world
            .layout
            .pickups
            .iter()
            .filter(|pickup| !pickup.collected)
            .any(|pickup| {
                let gap = pickup.rect.x - front;
                let above = top - pickup.rect.bottom();
                (0.0..=reach).contains(&gap) && above > 0.0 && above <= self.tuning.pickup_reach
            })
    }
}

impl AutopilotBot for HopperBot {
    fn id(&self) -> &'static str {
        "hopper"
    }

    fn description(&self) -> &'static str {
        "jumps over hazards ahead and hops for overhead pickups"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, world: &WorldSnapshot) -> FrameInput {
        if !world.body.grounded || world.body.falling {
            return FrameInput::default();
        }
        FrameInput {
            jump: self.hazard_ahead(world) || self.pickup_overhead(world),
        }
    }
}

const BOT_IDS: [&str; 2] = ["hopper", "idle"];

pub fn bot_ids() -> &'static [&'static str] {
    &BOT_IDS
}

pub fn create_bot(id: &str) -> Option<Box<dyn AutopilotBot>> {
    match id {
        "hopper" => Some(Box::new(HopperBot::default())),
        "idle" => Some(Box::new(IdleBot)),
        _ => None,
    }
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    bot_ids()
        .iter()
        .filter_map(|id| create_bot(id))
        .map(|bot| (bot.id(), bot.description()))
        .collect()
}
