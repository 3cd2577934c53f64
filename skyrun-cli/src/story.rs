//! Narration lines printed alongside run events.

use skyrun_core::sim::{EndReason, LevelCause};
use skyrun_core::{Character, RunEvent};

const LEVEL_PHRASES: [&str; 10] = [
    "You enter a glowing green forest with pink fireflies dancing around you.",
    "A soft pink mist rises from the grass as you follow a narrow path.",
    "You hear a distant waterfall hidden behind bright green leaves.",
    "Glowing pink flowers open as you walk past them.",
    "A friendly bird guides you deeper into the colourful jungle.",
    "You cross a tiny bridge made of green vines and pink crystals.",
    "Strange footprints appear on the soft moss ahead.",
    "Sparkling dust floats in the air like tiny stars.",
    "You discover a small pond that reflects pink and green light.",
    "The trees bend slightly, as if greeting their new hero.",
];

/// Careful choices, taken after a level that ran out of time.
const CAREFUL_CHOICES: [&str; 10] = [
    "Walk carefully between the glowing plants.",
    "Follow the pink stones.",
    "Listen closely and move ahead.",
    "Touch a flower gently.",
    "Wave at the bird.",
    "Step lightly on the bridge.",
    "Follow the footprints.",
    "Catch a bit of stardust.",
    "Sit by the pond for a moment.",
    "Whisper a wish to the forest.",
];

/// Bold choices, taken after a level cleared of every pickup.
const BOLD_CHOICES: [&str; 10] = [
    "Run along the bright path.",
    "Follow the sound of leaves.",
    "Call out to see who answers.",
    "Smell the sweet scent.",
    "Fly forward with excitement.",
    "Jump across the bridge.",
    "Walk around the footprints.",
    "Spin under the shining dust.",
    "Throw a stone into the pond.",
    "Shout your wish loudly.",
];

/// Scene line for a level; phrases repeat past the tenth level.
pub fn level_phrase(level: u32) -> &'static str {
    LEVEL_PHRASES[phrase_index(level)]
}

/// The choice that closes a level line; the opening level has none.
pub fn choice_phrase(level: u32, cause: LevelCause) -> Option<&'static str> {
    match cause {
        LevelCause::Start => None,
        LevelCause::Timeout => Some(CAREFUL_CHOICES[phrase_index(level)]),
        LevelCause::PickupsComplete => Some(BOLD_CHOICES[phrase_index(level)]),
    }
}

fn phrase_index(level: u32) -> usize {
    level.saturating_sub(1) as usize % LEVEL_PHRASES.len()
}

/// Narration for one event. `max_level` drives the progress label and the
/// gift line at the end of a cleared run.
pub fn narrate(event: &RunEvent, character: Character, max_level: u32) -> Option<String> {
    match *event {
        RunEvent::LevelChanged { level, cause } => {
            let lead = match cause {
                LevelCause::Start => String::new(),
                LevelCause::Timeout => "Time slips away. ".to_string(),
                LevelCause::PickupsComplete => "Every treasure found! ".to_string(),
            };
            let mut line = format!(
                "Level {level} / {max_level}: {lead}{} {}",
                level_phrase(level),
                character.tagline()
            );
            if let Some(choice) = choice_phrase(level, cause) {
                line.push(' ');
                line.push_str(choice);
            }
            Some(line)
        }
        RunEvent::LivesChanged { lives } if lives > 0 => {
            Some(format!("You stumble and climb back up. Lives left: {lives}."))
        }
        RunEvent::RunEnded { summary } => Some(match summary.reason {
            Some(EndReason::FinalLevelCleared) => format!(
                "You made it through all {max_level} levels with {} treasures. Open your gift!",
                summary.pickups
            ),
            _ => format!(
                "The adventure ends on level {} with {} treasures.",
                summary.level, summary.pickups
            ),
        }),
        _ => None,
    }
}
