//! Tunables for the simulation. Every hardcoded number the engine, the level
//! generator and the run state machine read lives here.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MAX_STARTING_LIVES: u32 = 3;
/// Upper bound on pickups, hazards or floating platforms in one level.
pub const MAX_LEVEL_OBJECTS: u32 = 1_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// The level timer advances inside `Run::step`.
    #[default]
    Virtual,
    /// A driver-owned timer calls `Run::second_elapsed` once per second.
    External,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // Run
    pub max_level: u32,
    pub starting_lives: u32,
    pub level_seconds: u32,
    pub frames_per_second: u32,
    pub clock: ClockMode,

    // Viewport
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Distance from the bottom of the viewport up to the ground line.
    pub ground_offset: f32,

    // Player
    pub player_width: f32,
    pub player_height: f32,
    pub player_start_x: f32,

    // Physics (per tick)
    pub gravity: f32,
    pub jump_impulse: f32,
    pub base_speed: f32,
    pub speed_increment: f32,
    pub fall_seed_velocity: f32,
    pub fall_margin: f32,
    pub hazard_tolerance: f32,
    pub contact_epsilon: f32,

    // Level generation
    pub level_length_base: f32,
    pub level_length_step: f32,
    pub safe_start: f32,
    pub end_margin: f32,
    pub pickups_base: u32,
    pub pickups_step: u32,
    pub hazards_base: u32,
    pub hazards_step: u32,
    pub platforms_base: u32,
    pub platforms_step: u32,
    pub pickup_size: f32,
    pub hazard_min_width: f32,
    pub hazard_max_width: f32,
    pub platform_min_width: f32,
    pub platform_max_width: f32,
    pub platform_thickness: f32,
    pub platform_base_height: f32,
    pub platform_wave_amplitude: f32,
    pub platform_wave_frequency: f32,
    pub platform_jitter: f32,
    pub pickup_min_height: f32,
    pub pickup_max_height: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            max_level: 5,
            starting_lives: 3,
            level_seconds: 30,
            frames_per_second: 60,
            clock: ClockMode::Virtual,

            viewport_width: 800.0,
            viewport_height: 400.0,
            ground_offset: 40.0,

            player_width: 32.0,
            player_height: 40.0,
            player_start_x: 60.0,

            gravity: 0.5,
            jump_impulse: -11.0,
            base_speed: 4.0,
            speed_increment: 0.75,
            fall_seed_velocity: 2.0,
            fall_margin: 60.0,
            hazard_tolerance: 2.0,
            contact_epsilon: 0.5,

            level_length_base: 2_000.0,
            level_length_step: 1_000.0,
            safe_start: 400.0,
            end_margin: 200.0,
            pickups_base: 5,
            pickups_step: 2,
            hazards_base: 2,
            hazards_step: 1,
            platforms_base: 4,
            platforms_step: 2,
            pickup_size: 20.0,
            hazard_min_width: 50.0,
            hazard_max_width: 90.0,
            platform_min_width: 90.0,
            platform_max_width: 160.0,
            platform_thickness: 16.0,
            platform_base_height: 85.0,
            platform_wave_amplitude: 25.0,
            platform_wave_frequency: 0.9,
            platform_jitter: 8.0,
            pickup_min_height: 30.0,
            pickup_max_height: 140.0,
        }
    }
}

impl SimConfig {
    /// Screen-space y of the ground line.
    #[inline]
    pub fn ground_y(&self) -> f32 {
        self.viewport_height - self.ground_offset
    }

    #[inline]
    pub fn scroll_anchor_x(&self) -> f32 {
        self.viewport_width / 2.0
    }

    pub fn level_length(&self, level: u32) -> f32 {
        self.level_length_base + self.level_length_step * level as f32
    }

    pub fn pickup_count(&self, level: u32) -> usize {
        linear_count(self.pickups_base, self.pickups_step, level)
    }

    pub fn hazard_count(&self, level: u32) -> usize {
        linear_count(self.hazards_base, self.hazards_step, level)
    }

    pub fn platform_count(&self, level: u32) -> usize {
        linear_count(self.platforms_base, self.platforms_step, level)
    }

    pub fn speed_for_level(&self, level: u32) -> f32 {
        self.base_speed + self.speed_increment * level.saturating_sub(1) as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level == 0 {
            return Err(ConfigError::ZeroCount { field: "max_level" });
        }
        if self.level_seconds == 0 {
            return Err(ConfigError::ZeroCount {
                field: "level_seconds",
            });
        }
        if self.frames_per_second == 0 {
            return Err(ConfigError::ZeroCount {
                field: "frames_per_second",
            });
        }
        if self.starting_lives == 0 || self.starting_lives > MAX_STARTING_LIVES {
            return Err(ConfigError::StartingLivesOutOfRange {
                found: self.starting_lives,
            });
        }

        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("ground_offset", self.ground_offset),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("gravity", self.gravity),
            ("base_speed", self.base_speed),
            ("contact_epsilon", self.contact_epsilon),
            ("level_length_base", self.level_length_base),
            ("pickup_size", self.pickup_size),
            ("hazard_min_width", self.hazard_min_width),
            ("platform_min_width", self.platform_min_width),
            ("platform_thickness", self.platform_thickness),
        ];
        for (field, value) in positive {
            // `!(value > 0.0)` also catches NaN.
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { field, value });
            }
        }

        let non_negative = [
            ("speed_increment", self.speed_increment),
            ("level_length_step", self.level_length_step),
            ("fall_seed_velocity", self.fall_seed_velocity),
            ("fall_margin", self.fall_margin),
            ("hazard_tolerance", self.hazard_tolerance),
            ("safe_start", self.safe_start),
            ("end_margin", self.end_margin),
            ("player_start_x", self.player_start_x),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }

        if !(self.jump_impulse < 0.0) {
            return Err(ConfigError::JumpImpulseNotUpward {
                value: self.jump_impulse,
            });
        }

        let ranges = [
            (
                ("hazard_min_width", self.hazard_min_width),
                ("hazard_max_width", self.hazard_max_width),
            ),
            (
                ("platform_min_width", self.platform_min_width),
                ("platform_max_width", self.platform_max_width),
            ),
            (
                ("pickup_min_height", self.pickup_min_height),
                ("pickup_max_height", self.pickup_max_height),
            ),
        ];
        for ((min_field, min), (max_field, max)) in ranges {
            if !(min <= max) {
                return Err(ConfigError::InvertedRange {
                    min_field,
                    max_field,
                    min,
                    max,
                });
            }
        }

        // Counts grow with the level, so the last level bounds every other.
        let counts = [
            ("pickups", self.pickups_base, self.pickups_step),
            ("hazards", self.hazards_base, self.hazards_step),
            ("platforms", self.platforms_base, self.platforms_step),
        ];
        for (field, base, step) in counts {
            let at_last_level = step
                .checked_mul(self.max_level)
                .and_then(|grown| grown.checked_add(base));
            if !at_last_level.is_some_and(|count| count <= MAX_LEVEL_OBJECTS) {
                return Err(ConfigError::TooManyObjects {
                    field,
                    level: self.max_level,
                    limit: MAX_LEVEL_OBJECTS,
                });
            }
        }

        if self.ground_offset >= self.viewport_height
            || self.ground_y() < self.player_height
        {
            return Err(ConfigError::GroundOutsideViewport {
                ground_offset: self.ground_offset,
                viewport_height: self.viewport_height,
            });
        }

        let widest = self
            .hazard_max_width
            .max(self.platform_max_width)
            .max(self.pickup_size);
        let first_length = self.level_length(1);
        if self.safe_start + self.end_margin + widest >= first_length {
            return Err(ConfigError::NoSpawnRoom {
                safe_start: self.safe_start,
                end_margin: self.end_margin,
                level_length: first_length,
            });
        }

        Ok(())
    }
}

fn linear_count(base: u32, step: u32, level: u32) -> usize {
    base.saturating_add(step.saturating_mul(level)) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        SimConfig::default()
            .validate()
            .expect("defaults must validate");
    }

    #[test]
    fn pickup_counts_follow_linear_formula() {
        let config = SimConfig::default();
        assert_eq!(config.pickup_count(1), 7);
        assert_eq!(config.pickup_count(2), 9);
        assert_eq!(config.pickup_count(5), 15);
    }

    #[test]
    fn rejects_zero_level_time() {
        let config = SimConfig {
            level_seconds: 0,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCount {
                field: "level_seconds"
            })
        );
    }

    #[test]
    fn rejects_downward_jump() {
        let config = SimConfig {
            jump_impulse: 3.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::JumpImpulseNotUpward { .. })
        ));
    }

    #[test]
    fn rejects_nan_gravity() {
        let config = SimConfig {
            gravity: f32::NAN,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "gravity",
                ..
            })
        ));
    }

    #[test]
    fn rejects_level_without_spawn_room() {
        let config = SimConfig {
            level_length_base: 100.0,
            level_length_step: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoSpawnRoom { .. })
        ));
    }

    #[test]
    fn rejects_more_than_three_lives() {
        let config = SimConfig {
            starting_lives: 4,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::StartingLivesOutOfRange { found: 4 })
        );
    }

    #[test]
    fn rejects_count_overflow() {
        let config = SimConfig {
            pickups_step: u32::MAX,
            ..SimConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::TooManyObjects {
                field: "pickups",
                level: 5,
                limit: MAX_LEVEL_OBJECTS,
            })
        );
        assert_eq!(config.pickup_count(2), u32::MAX as usize);
    }

    #[test]
    fn rejects_counts_over_the_limit_at_the_last_level() {
        let config = SimConfig {
            max_level: 100,
            hazards_step: 10,
            ..SimConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooManyObjects {
                field: "hazards",
                level: 100,
                ..
            })
        ));

        let at_limit = SimConfig {
            max_level: 1,
            platforms_base: 0,
            platforms_step: MAX_LEVEL_OBJECTS,
            ..SimConfig::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_generation_ranges() {
        let hazards = SimConfig {
            hazard_min_width: 100.0,
            hazard_max_width: 60.0,
            ..SimConfig::default()
        };
        let platforms = SimConfig {
            platform_min_width: 200.0,
            platform_max_width: 150.0,
            ..SimConfig::default()
        };
        let pickups = SimConfig {
            pickup_min_height: 150.0,
            pickup_max_height: 20.0,
            ..SimConfig::default()
        };

        for (config, field) in [
            (hazards, "hazard_min_width"),
            (platforms, "platform_min_width"),
            (pickups, "pickup_min_height"),
        ] {
            assert!(
                matches!(
                    config.validate(),
                    Err(ConfigError::InvertedRange { min_field, .. }) if min_field == field
                ),
                "{field}"
            );
        }
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{ "max_level": 2, "clock": "external" }"#)
                .expect("partial config should parse");
        assert_eq!(config.max_level, 2);
        assert_eq!(config.clock, ClockMode::External);
        assert_eq!(config.level_seconds, SimConfig::default().level_seconds);
    }
}
