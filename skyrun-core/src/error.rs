use std::fmt;

use crate::sim::RunPhase;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    LivesRange,
    PhaseLivesConsistency,
    LevelRange,
    BodyFallingGrounded,
    BodyBounds,
    PickupCountConsistency,
    ScrollNegative,
    TimeRange,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LivesRange => write!(f, "LIVES_RANGE"),
            Self::PhaseLivesConsistency => write!(f, "PHASE_LIVES_CONSISTENCY"),
            Self::LevelRange => write!(f, "LEVEL_RANGE"),
            Self::BodyFallingGrounded => write!(f, "BODY_FALLING_GROUNDED"),
            Self::BodyBounds => write!(f, "BODY_BOUNDS"),
            Self::PickupCountConsistency => write!(f, "PICKUP_COUNT_CONSISTENCY"),
            Self::ScrollNegative => write!(f, "SCROLL_NEGATIVE"),
            Self::TimeRange => write!(f, "TIME_RANGE"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    NonPositive { field: &'static str, value: f32 },
    Negative { field: &'static str, value: f32 },
    ZeroCount { field: &'static str },
    JumpImpulseNotUpward { value: f32 },
    GroundOutsideViewport { ground_offset: f32, viewport_height: f32 },
    NoSpawnRoom { safe_start: f32, end_margin: f32, level_length: f32 },
    StartingLivesOutOfRange { found: u32 },
    InvertedRange {
        min_field: &'static str,
        max_field: &'static str,
        min: f32,
        max: f32,
    },
    TooManyObjects {
        field: &'static str,
        level: u32,
        limit: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be > 0, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must be >= 0, got {value}")
            }
            Self::ZeroCount { field } => write!(f, "{field} must be at least 1"),
            Self::JumpImpulseNotUpward { value } => {
                write!(f, "jump_impulse must be negative (upward), got {value}")
            }
            Self::GroundOutsideViewport {
                ground_offset,
                viewport_height,
            } => write!(
                f,
                "ground_offset {ground_offset} leaves no ground line inside a viewport of height {viewport_height}"
            ),
            Self::NoSpawnRoom {
                safe_start,
                end_margin,
                level_length,
            } => write!(
                f,
                "level 1 is {level_length} long, which leaves no spawn room between safe_start {safe_start} and end_margin {end_margin}"
            ),
            Self::StartingLivesOutOfRange { found } => {
                write!(f, "starting_lives must be in 1..=3, got {found}")
            }
            Self::InvertedRange {
                min_field,
                max_field,
                min,
                max,
            } => write!(f, "{min_field} ({min}) must not exceed {max_field} ({max})"),
            Self::TooManyObjects {
                field,
                level,
                limit,
            } => write!(f, "{field} at level {level} exceeds the limit of {limit}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone, Debug, PartialEq)]
pub enum RunError {
    InvalidConfig(ConfigError),
    WrongPhase {
        action: &'static str,
        expected: RunPhase,
        found: RunPhase,
    },
    RuleViolation { frame: u32, rule: RuleCode },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
            Self::WrongPhase {
                action,
                expected,
                found,
            } => write!(f, "cannot {action}: run is {found:?}, expected {expected:?}"),
            Self::RuleViolation { frame, rule } => {
                write!(f, "rule violation at frame {frame}: {rule}")
            }
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for RunError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapeError {
    TapeTooShort { actual: usize, min: usize },
    InvalidMagic { found: u32 },
    UnsupportedVersion { found: u8 },
    UnknownCharacter { found: u8 },
    HeaderReservedNonZero,
    FrameCountOutOfRange { frame_count: u32, max_frames: u32 },
    TapeLengthMismatch { expected: usize, actual: usize },
    ReservedInputBitsNonZero { frame: u32, byte: u8 },
    CrcMismatch { stored: u32, computed: u32 },
}

impl fmt::Display for TapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TapeTooShort { actual, min } => {
                write!(f, "tape too short: got {actual} bytes, need at least {min}")
            }
            Self::InvalidMagic { found } => write!(f, "invalid tape magic: 0x{found:08x}"),
            Self::UnsupportedVersion { found } => write!(f, "unsupported tape version: {found}"),
            Self::UnknownCharacter { found } => write!(f, "unknown character id: {found}"),
            Self::HeaderReservedNonZero => write!(f, "header reserved bytes are non-zero"),
            Self::FrameCountOutOfRange {
                frame_count,
                max_frames,
            } => write!(
                f,
                "frame count out of range: {frame_count} (allowed 1..={max_frames})"
            ),
            Self::TapeLengthMismatch { expected, actual } => write!(
                f,
                "tape length mismatch: expected {expected} bytes, got {actual}"
            ),
            Self::ReservedInputBitsNonZero { frame, byte } => write!(
                f,
                "input byte reserved bits set at frame {frame}: 0x{byte:02x}"
            ),
            Self::CrcMismatch { stored, computed } => write!(
                f,
                "crc mismatch: stored=0x{stored:08x}, computed=0x{computed:08x}"
            ),
        }
    }
}

impl std::error::Error for TapeError {}
