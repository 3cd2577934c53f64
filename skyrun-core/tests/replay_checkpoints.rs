use skyrun_core::sim::{replay, replay_with_checkpoints, Checkpoint};
use skyrun_core::tape::{encode_inputs, parse_tape, serialize_tape};
use skyrun_core::{Character, FrameInput, Run, SimConfig, TickOutcome};

fn mix_u64(hash: u64, value: u64) -> u64 {
    // FNV-1a style mix.
    hash.wrapping_mul(0x0000_0100_0000_01B3) ^ value
}

fn checkpoint_fingerprint(checkpoints: &[Checkpoint]) -> u64 {
    let mut hash = 0xCBF2_9CE4_8422_2325u64;

    for checkpoint in checkpoints {
        hash = mix_u64(hash, checkpoint.frame_count as u64);
        hash = mix_u64(hash, checkpoint.rng_state as u64);
        hash = mix_u64(hash, checkpoint.level as u64);
        hash = mix_u64(hash, checkpoint.lives as u64);
        hash = mix_u64(hash, checkpoint.pickups as u64);
        hash = mix_u64(hash, checkpoint.seconds_left as u64);
        hash = mix_u64(hash, checkpoint.scroll.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.body_x.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.body_y.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.body_vel_y.to_bits() as u64);
        hash = mix_u64(hash, checkpoint.grounded as u64);
        hash = mix_u64(hash, checkpoint.falling as u64);
    }

    hash
}

/// Jumps in short bursts on a fixed rhythm, enough to touch platforms,
/// pickups and hazards over a few thousand frames.
fn scripted_inputs(frames: usize) -> Vec<FrameInput> {
    (0..frames)
        .map(|frame| FrameInput {
            jump: frame % 41 < 2 || frame % 97 == 50,
        })
        .collect()
}

#[test]
fn checkpoint_fingerprint_is_stable_across_replays() {
    let inputs = scripted_inputs(6_000);

    let first =
        replay_with_checkpoints(SimConfig::default(), 0xC0FF_EE11, Character::Ninja, &inputs, 50)
            .expect("default config is valid");
    let second =
        replay_with_checkpoints(SimConfig::default(), 0xC0FF_EE11, Character::Ninja, &inputs, 50)
            .expect("default config is valid");

    assert_eq!(checkpoint_fingerprint(&first), checkpoint_fingerprint(&second));
    assert_eq!(first, second);
}

#[test]
fn different_seeds_produce_different_worlds() {
    let inputs = scripted_inputs(600);

    let a = replay_with_checkpoints(SimConfig::default(), 1, Character::Explorer, &inputs, 60)
        .expect("default config is valid");
    let b = replay_with_checkpoints(SimConfig::default(), 2, Character::Explorer, &inputs, 60)
        .expect("default config is valid");

    assert_ne!(a[0].rng_state, b[0].rng_state);
}

#[test]
fn checkpoints_bracket_the_replayed_frames() {
    let inputs = scripted_inputs(1_234);
    let checkpoints =
        replay_with_checkpoints(SimConfig::default(), 77, Character::Fairy, &inputs, 100)
            .expect("default config is valid");

    assert_eq!(checkpoints.first().expect("checkpoint").frame_count, 0);
    let last = checkpoints.last().expect("checkpoint").frame_count;
    assert!(last <= inputs.len() as u32);
    assert!(checkpoints
        .windows(2)
        .all(|pair| pair[0].frame_count < pair[1].frame_count));
}

#[test]
fn replay_matches_a_live_run() {
    let config = SimConfig::default();
    let inputs = scripted_inputs(8_000);

    let mut live = Run::new(config.clone(), 0xDEAD_BEEF).expect("default config is valid");
    live.start_run(Character::Explorer)
        .expect("fresh run starts");
    for input in &inputs {
        live.step_checked(*input)
            .expect("scripted run keeps every invariant");
        if live.summary().reason.is_some() {
            break;
        }
    }

    let replayed =
        replay(config, 0xDEAD_BEEF, Character::Explorer, &inputs).expect("default config is valid");

    assert_eq!(replayed, live.summary());
}

#[test]
fn tape_roundtrip_reproduces_the_recorded_summary() {
    let config = SimConfig::default();
    let inputs = scripted_inputs(3_000);

    let mut run = Run::new(config.clone(), 42).expect("default config is valid");
    run.start_run(Character::Ninja).expect("fresh run starts");
    let mut recorded = Vec::new();
    for input in &inputs {
        recorded.push(*input);
        if let TickOutcome::Ended(_) = run.step(*input) {
            break;
        }
    }
    let summary = run.summary();

    let bytes = serialize_tape(
        42,
        Character::Ninja,
        &encode_inputs(&recorded),
        summary.pickups,
        summary.level,
    );
    let tape = parse_tape(&bytes, 100_000).expect("freshly written tape parses");
    let replayed = replay(
        config,
        tape.header.seed,
        tape.header.character,
        &tape.frame_inputs(),
    )
    .expect("default config is valid");

    assert_eq!(replayed, summary);
    assert_eq!(tape.footer.final_pickups, replayed.pickups);
    assert_eq!(tape.footer.final_level, replayed.level);
}
