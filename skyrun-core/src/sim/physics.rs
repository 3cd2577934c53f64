//! One tick of player movement against the current level layout.
//!
//! Order inside a normal tick is fixed: integrate, land on platforms, test
//! hazards, clamp to the ground, collect pickups, check level completion,
//! then follow with the scroll offset. Completing the level skips the scroll
//! but still pins the body inside `[0, anchor]`. A hazard hit skips the
//! ground clamp for that tick, and while the body is falling nothing but
//! gravity runs.
//! There is no sub-stepping, so a body moving faster than a platform is
//! thick can tunnel through it.

use crate::config::SimConfig;
use crate::geometry::{overlaps, Rect};
use crate::world::{Hazard, LevelLayout, Pickup, Platform};

use super::{Body, FrameInput};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhysicsStatus {
    #[default]
    Running,
    /// The hazard fall animation left the screen.
    FallComplete,
    /// Every pickup in the level has been collected.
    LevelComplete,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    pub status: PhysicsStatus,
    pub collected: u32,
    pub fall_started: bool,
}

pub fn advance(
    body: &mut Body,
    layout: &mut LevelLayout,
    scroll: &mut f32,
    speed: f32,
    input: FrameInput,
    config: &SimConfig,
) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();

    if body.falling {
        body.vel_y += config.gravity;
        body.y += body.vel_y;
        if body.y > config.viewport_height + config.fall_margin {
            outcome.status = PhysicsStatus::FallComplete;
        }
        return outcome;
    }

    if !body.grounded {
        body.vel_y += config.gravity;
    }
    if input.jump && body.grounded {
        body.vel_y = config.jump_impulse;
        body.grounded = false;
    }
    body.vel_x = speed;
    body.x += body.vel_x;
    body.y += body.vel_y;

    body.grounded = false;
    land_on_platforms(body, &layout.platforms, *scroll, config.contact_epsilon);

    if over_hazard(body, &layout.hazards, *scroll, config) {
        body.falling = true;
        body.grounded = false;
        body.vel_y = config.fall_seed_velocity;
        outcome.fall_started = true;
    } else {
        clamp_to_ground(body, config.ground_y());
    }

    outcome.collected = collect_pickups(body, &mut layout.pickups, *scroll);

    if layout.all_collected() {
        outcome.status = PhysicsStatus::LevelComplete;
        body.x = body.x.clamp(0.0, config.scroll_anchor_x());
        return outcome;
    }

    follow_with_scroll(body, scroll, speed, config.scroll_anchor_x());
    outcome
}

/// Lands the body on the highest platform it may rest on. The probe reaches
/// `contact_epsilon` below the feet so a body resting exactly on a top edge
/// keeps its contact.
fn land_on_platforms(body: &mut Body, platforms: &[Platform], scroll: f32, contact_epsilon: f32) {
    if body.vel_y < 0.0 {
        return;
    }

    let probe = Rect::new(body.x, body.y, body.width, body.height + contact_epsilon);
    let landing_top = platforms
        .iter()
        .map(|platform| platform.rect.translated(-scroll, 0.0))
        .filter(|rect| body.y < rect.y && overlaps(&probe, rect))
        .map(|rect| rect.y)
        .min_by(f32::total_cmp);

    if let Some(top) = landing_top {
        body.y = top - body.height;
        body.vel_y = 0.0;
        body.grounded = true;
    }
}

fn over_hazard(body: &Body, hazards: &[Hazard], scroll: f32, config: &SimConfig) -> bool {
    let feet_on_ground = body.rect().bottom() >= config.ground_y() - config.hazard_tolerance;
    if !feet_on_ground {
        return false;
    }

    let center_world_x = body.rect().center_x() + scroll;
    hazards
        .iter()
        .any(|hazard| hazard.rect.x < center_world_x && center_world_x < hazard.rect.right())
}

fn clamp_to_ground(body: &mut Body, ground_y: f32) {
    if body.rect().bottom() >= ground_y {
        body.y = ground_y - body.height;
        body.vel_y = 0.0;
        body.grounded = true;
    }
}

fn collect_pickups(body: &Body, pickups: &mut [Pickup], scroll: f32) -> u32 {
    let hitbox = body.rect();
    let mut collected = 0;
    for pickup in pickups.iter_mut().filter(|pickup| !pickup.collected) {
        if overlaps(&hitbox, &pickup.rect.translated(-scroll, 0.0)) {
            pickup.collected = true;
            collected += 1;
        }
    }
    collected
}

fn follow_with_scroll(body: &mut Body, scroll: &mut f32, speed: f32, anchor_x: f32) {
    if body.x > anchor_x {
        *scroll += speed;
        body.x = anchor_x;
    } else if body.x < 0.0 {
        body.x = 0.0;
    }
}
