//! Level layout and its generator. All rects here are in world space; the
//! engine subtracts the scroll offset before testing them against the body.

use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::geometry::Rect;
use crate::rng::SeededRng;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Ground,
    Floating,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub rect: Rect,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub rect: Rect,
    pub collected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub level: u32,
    pub length: f32,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub pickups: Vec<Pickup>,
}

impl LevelLayout {
    pub fn collected_count(&self) -> usize {
        self.pickups.iter().filter(|pickup| pickup.collected).count()
    }

    /// True once every pickup is taken. A level without pickups never
    /// completes this way.
    pub fn all_collected(&self) -> bool {
        !self.pickups.is_empty() && self.pickups.iter().all(|pickup| pickup.collected)
    }
}

pub fn generate_level(level: u32, config: &SimConfig, rng: &mut SeededRng) -> LevelLayout {
    let length = config.level_length(level);
    let ground_y = config.ground_y();

    let platform_count = config.platform_count(level);
    let mut platforms = Vec::with_capacity(platform_count + 1);
    platforms.push(Platform {
        rect: Rect::new(0.0, ground_y, length, config.ground_offset),
        kind: PlatformKind::Ground,
    });

    // Floating platforms are spread over equal slots so index order is also
    // left-to-right order, which keeps the height wave smooth on screen.
    let usable = length - config.end_margin - config.safe_start;
    let slot = usable / platform_count.max(1) as f32;
    for index in 0..platform_count {
        let width = rng.next_range_f32(config.platform_min_width, config.platform_max_width);
        let slot_start = config.safe_start + slot * index as f32;
        let x = clamp_spawn_x(
            slot_start + rng.next_range_f32(0.0, (slot - width).max(0.0)),
            width,
            length,
            config,
        );

        let wave = (index as f32 * config.platform_wave_frequency).sin();
        let jitter = rng.next_range_f32(-config.platform_jitter, config.platform_jitter);
        let lift = config.platform_base_height + wave * config.platform_wave_amplitude + jitter;

        platforms.push(Platform {
            rect: Rect::new(x, ground_y - lift, width, config.platform_thickness),
            kind: PlatformKind::Floating,
        });
    }

    let hazard_count = config.hazard_count(level);
    let mut hazards = Vec::with_capacity(hazard_count);
    for _ in 0..hazard_count {
        let width = rng.next_range_f32(config.hazard_min_width, config.hazard_max_width);
        let x = random_spawn_x(rng, width, length, config);
        hazards.push(Hazard {
            rect: Rect::new(x, ground_y, width, config.ground_offset),
        });
    }
    hazards.sort_by(|a, b| a.rect.x.total_cmp(&b.rect.x));

    let pickup_count = config.pickup_count(level);
    let mut pickups = Vec::with_capacity(pickup_count);
    for _ in 0..pickup_count {
        let size = config.pickup_size;
        let x = random_spawn_x(rng, size, length, config);
        let lift = rng.next_range_f32(config.pickup_min_height, config.pickup_max_height);
        pickups.push(Pickup {
            rect: Rect::new(x, ground_y - lift - size, size, size),
            collected: false,
        });
    }

    LevelLayout {
        level,
        length,
        platforms,
        hazards,
        pickups,
    }
}

#[inline]
fn spawn_max_x(width: f32, length: f32, config: &SimConfig) -> f32 {
    (length - config.end_margin - width).max(config.safe_start)
}

fn random_spawn_x(rng: &mut SeededRng, width: f32, length: f32, config: &SimConfig) -> f32 {
    rng.next_range_f32(config.safe_start, spawn_max_x(width, length, config))
}

fn clamp_spawn_x(x: f32, width: f32, length: f32, config: &SimConfig) -> f32 {
    x.clamp(config.safe_start, spawn_max_x(width, length, config))
}
