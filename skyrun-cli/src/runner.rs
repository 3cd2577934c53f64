use crate::bots::{create_bot, AutopilotBot};
use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use skyrun_core::sim::{replay, EndReason, LevelCause};
use skyrun_core::tape::{encode_inputs, parse_tape, serialize_tape};
use skyrun_core::{Character, FrameInput, Run, RunEvent, RunSummary, SimConfig, TickOutcome};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub character: Character,
    pub max_frames: u32,
    pub frame_count: u32,
    pub pickups: u32,
    pub level: u32,
    pub lives: u32,
    pub reason: Option<EndReason>,
    pub jump_frames: u32,
    pub levels_by_timeout: u32,
    pub levels_by_pickups: u32,
    pub lives_lost: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<FrameInput>,
    pub tape: Vec<u8>,
    pub events: Vec<RunEvent>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReplayReport {
    pub seed: u32,
    pub frame_count: u32,
    pub summary: RunSummary,
    pub footer_pickups: u32,
    pub footer_level: u32,
}

pub fn run_bot(
    bot_id: &str,
    config: &SimConfig,
    seed: u32,
    character: Character,
    max_frames: u32,
) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), config, seed, character, max_frames)
}

/// Drives one run with `bot` until it ends or `max_frames` is reached, with
/// invariant checks on every frame, then verifies the recorded tape replays
/// to the same result.
pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    config: &SimConfig,
    seed: u32,
    character: Character,
    max_frames: u32,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        bail!("max_frames must be > 0");
    }

    bot.reset(seed);

    let mut run = Run::new(config.clone(), seed).context("failed creating run")?;
    run.start_run(character)?;
    run.validate()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let mut events = run.drain_events();
    let mut inputs = Vec::with_capacity(max_frames as usize);
    let mut levels_by_timeout = 0u32;
    let mut levels_by_pickups = 0u32;
    let mut lives_lost = 0u32;

    while (inputs.len() as u32) < max_frames {
        let input = bot.next_input(&run.snapshot());
        inputs.push(input);
        let outcome = run.step_checked(input)?;
        events.extend(run.drain_events());

        match outcome {
            TickOutcome::LevelAdvanced { cause, .. } => match cause {
                LevelCause::Timeout => levels_by_timeout += 1,
                LevelCause::PickupsComplete => levels_by_pickups += 1,
                LevelCause::Start => {}
            },
            TickOutcome::LifeLost { .. } => lives_lost += 1,
            TickOutcome::Ended(summary) => {
                if summary.reason == Some(EndReason::LivesExhausted) {
                    lives_lost += 1;
                }
                break;
            }
            TickOutcome::Idle | TickOutcome::Continue => {}
        }
    }

    let summary = run.summary();
    let tape = serialize_tape(
        seed,
        character,
        &encode_inputs(&inputs),
        summary.pickups,
        summary.level,
    );
    let replayed = replay(config.clone(), seed, character, &inputs)?;
    if replayed != summary {
        bail!("recorded inputs replay to {replayed:?}, live run ended at {summary:?}");
    }

    tracing::info!(
        bot = bot.id(),
        seed,
        frames = summary.frame_count,
        pickups = summary.pickups,
        level = summary.level,
        "autopilot run finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            character,
            max_frames,
            frame_count: summary.frame_count,
            pickups: summary.pickups,
            level: summary.level,
            lives: summary.lives,
            reason: summary.reason,
            jump_frames: inputs.iter().filter(|input| input.jump).count() as u32,
            levels_by_timeout,
            levels_by_pickups,
            lives_lost,
        },
        inputs,
        tape,
        events,
    })
}

/// Replays a tape and checks the result against the score stored in its footer.
pub fn replay_tape(bytes: &[u8], config: &SimConfig, max_frames: u32) -> Result<ReplayReport> {
    let tape = parse_tape(bytes, max_frames).context("failed parsing tape")?;
    let summary = replay(
        config.clone(),
        tape.header.seed,
        tape.header.character,
        &tape.frame_inputs(),
    )?;

    if summary.pickups != tape.footer.final_pickups || summary.level != tape.footer.final_level {
        bail!(
            "tape claims {} pickups at level {}, replay reached {} pickups at level {}",
            tape.footer.final_pickups,
            tape.footer.final_level,
            summary.pickups,
            summary.level
        );
    }

    Ok(ReplayReport {
        seed: tape.header.seed,
        frame_count: tape.header.frame_count,
        summary,
        footer_pickups: tape.footer.final_pickups,
        footer_level: tape.footer.final_level,
    })
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}
