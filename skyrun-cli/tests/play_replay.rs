use anyhow::Result;
use skyrun_cli::bots::bot_ids;
use skyrun_cli::config::load_config_with;
use skyrun_cli::runner::{replay_tape, run_bot, write_tape};
use skyrun_core::tape::TAPE_HEADER_SIZE;
use skyrun_core::{Character, RunEvent, SimConfig};
use std::fs;

#[test]
fn all_bots_produce_replayable_tapes() -> Result<()> {
    let config = SimConfig::default();
    for seed in [0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678] {
        for bot in bot_ids() {
            let artifact = run_bot(bot, &config, seed, Character::Explorer, 2_400)?;
            assert!(artifact.metrics.frame_count > 0, "bot={bot} seed={seed:#x}");
            assert_eq!(artifact.metrics.bot_id, *bot);
            assert_eq!(
                artifact.tape.len(),
                TAPE_HEADER_SIZE + artifact.inputs.len() + 12,
                "bot={bot} seed={seed:#x}"
            );

            let report = replay_tape(&artifact.tape, &config, 100_000)?;
            assert_eq!(report.summary.pickups, artifact.metrics.pickups);
            assert_eq!(report.summary.level, artifact.metrics.level);
        }
    }
    Ok(())
}

#[test]
fn written_tape_replays_from_disk() -> Result<()> {
    let config = SimConfig::default();
    let artifact = run_bot("hopper", &config, 7, Character::Fairy, 3_000)?;

    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("runs").join("hopper.tape");
    write_tape(&path, &artifact.tape)?;

    let bytes = fs::read(&path)?;
    let report = replay_tape(&bytes, &config, 100_000)?;
    assert_eq!(report.seed, 7);
    assert_eq!(report.frame_count, artifact.inputs.len() as u32);
    assert_eq!(report.summary.character, Character::Fairy);
    Ok(())
}

#[test]
fn replay_rejects_a_tape_with_a_forged_score() -> Result<()> {
    let config = SimConfig::default();
    let artifact = run_bot("idle", &config, 99, Character::Ninja, 600)?;

    let mut forged = artifact.tape.clone();
    let footer = forged.len() - 12;
    let claimed = artifact.metrics.pickups + 5;
    forged[footer..footer + 4].copy_from_slice(&claimed.to_le_bytes());

    assert!(replay_tape(&forged, &config, 100_000).is_err());
    Ok(())
}

#[test]
fn idle_bot_times_out_instead_of_finishing_levels() -> Result<()> {
    let config = SimConfig {
        level_seconds: 2,
        hazards_base: 0,
        hazards_step: 0,
        ..SimConfig::default()
    };
    let artifact = run_bot("idle", &config, 5, Character::Explorer, 60 * 2 * 3)?;

    assert_eq!(artifact.metrics.levels_by_timeout, 3);
    assert_eq!(artifact.metrics.lives_lost, 0);
    assert!(artifact.events.contains(&RunEvent::LevelChanged {
        level: 4,
        cause: skyrun_core::sim::LevelCause::Timeout,
    }));
    Ok(())
}

#[test]
fn config_file_and_env_layer_over_defaults() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("skyrun.json");
    fs::write(&path, r#"{ "max_level": 3, "gravity": 0.6 }"#)?;

    let config = load_config_with(Some(path.as_path()), |name| {
        (name == "SKYRUN_LEVEL_SECONDS").then(|| "45".to_string())
    })?;

    assert_eq!(config.max_level, 3);
    assert_eq!(config.gravity, 0.6);
    assert_eq!(config.level_seconds, 45);
    assert_eq!(config.base_speed, SimConfig::default().base_speed);
    Ok(())
}

#[test]
fn invalid_config_files_are_rejected() -> Result<()> {
    let tmp = tempfile::tempdir()?;

    let bad_json = tmp.path().join("broken.json");
    fs::write(&bad_json, "{ max_level: ")?;
    assert!(load_config_with(Some(bad_json.as_path()), |_| None).is_err());

    let bad_value = tmp.path().join("upside_down.json");
    fs::write(&bad_value, r#"{ "jump_impulse": 4.0 }"#)?;
    let err = load_config_with(Some(bad_value.as_path()), |_| None).unwrap_err();
    assert!(format!("{err:#}").contains("jump_impulse"));

    let missing = tmp.path().join("missing.json");
    assert!(load_config_with(Some(missing.as_path()), |_| None).is_err());
    Ok(())
}
