use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use skyrun_cli::ascii::AsciiSurface;
use skyrun_cli::bots::{bot_ids, create_bot, describe_bots};
use skyrun_cli::config::load_config;
use skyrun_cli::runner::{replay_tape, run_bot, write_tape};
use skyrun_cli::story::narrate;
use skyrun_cli::util::{clock_seed, parse_seed, seed_to_hex};
use skyrun_core::render::draw_frame;
use skyrun_core::{Character, Run};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skyrun")]
#[command(about = "Headless driver for the skyrun auto-runner simulation")]
struct Cli {
    /// JSON file with simulation overrides; missing fields keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available autopilot bots
    ListBots,
    /// Play one run with an autopilot bot and print its summary
    Play {
        #[arg(long, default_value = "hopper")]
        bot: String,
        /// Decimal or 0x-prefixed hex; defaults to the wall clock
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, value_enum, default_value_t = CliCharacter::Explorer)]
        character: CliCharacter,
        #[arg(long, default_value_t = 36_000)]
        max_frames: u32,
        /// Write the recorded input tape here
        #[arg(long)]
        tape_out: Option<PathBuf>,
        /// Print every run event as a JSON line
        #[arg(long, default_value_t = false)]
        events: bool,
        /// Print narration for level changes and the ending
        #[arg(long, default_value_t = false)]
        story: bool,
    },
    /// Replay a tape and check it against the result stored in its footer
    Replay {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = 108_000)]
        max_frames: u32,
    },
    /// Step an autopilot run for some frames and print the view as ASCII
    Render {
        #[arg(long, default_value = "hopper")]
        bot: String,
        #[arg(long)]
        seed: Option<String>,
        #[arg(long, value_enum, default_value_t = CliCharacter::Explorer)]
        character: CliCharacter,
        #[arg(long, default_value_t = 120)]
        frames: u32,
        #[arg(long, default_value_t = 80)]
        cols: usize,
        #[arg(long, default_value_t = 20)]
        rows: usize,
    },
    /// Print the effective configuration as JSON
    Config,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliCharacter {
    Explorer,
    Ninja,
    Fairy,
}

impl From<CliCharacter> for Character {
    fn from(value: CliCharacter) -> Self {
        match value {
            CliCharacter::Explorer => Character::Explorer,
            CliCharacter::Ninja => Character::Ninja,
            CliCharacter::Fairy => Character::Fairy,
        }
    }
}

fn resolve_seed(seed: Option<String>) -> Result<u32> {
    match seed {
        Some(seed) => parse_seed(&seed),
        None => Ok(clock_seed()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let Cli { config, command } = Cli::parse();
    let config = load_config(config.as_deref())?;

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:10} {description}");
            }
        }
        Commands::Play {
            bot,
            seed,
            character,
            max_frames,
            tape_out,
            events,
            story,
        } => {
            let seed = resolve_seed(seed)?;
            let character = Character::from(character);
            let artifact = run_bot(&bot, &config, seed, character, max_frames)?;

            if events {
                for event in &artifact.events {
                    println!("{}", serde_json::to_string(event)?);
                }
            }
            if story {
                for line in artifact
                    .events
                    .iter()
                    .filter_map(|event| narrate(event, character, config.max_level))
                {
                    println!("{line}");
                }
            }
            if let Some(path) = &tape_out {
                write_tape(path, &artifact.tape)?;
                println!("tape={}", path.display());
            }

            println!("seed={}", seed_to_hex(seed));
            println!("{}", serde_json::to_string_pretty(&artifact.metrics)?);
        }
        Commands::Replay { input, max_frames } => {
            let bytes =
                fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;
            let report = replay_tape(&bytes, &config, max_frames)?;
            println!("seed={}", seed_to_hex(report.seed));
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Render {
            bot,
            seed,
            character,
            frames,
            cols,
            rows,
        } => {
            let mut pilot = create_bot(&bot).ok_or_else(|| {
                anyhow!("unknown bot '{bot}'. available: {}", bot_ids().join(", "))
            })?;
            let seed = resolve_seed(seed)?;
            pilot.reset(seed);

            let mut run = Run::new(config, seed)?;
            run.start_run(character.into())?;
            for _ in 0..frames {
                let input = pilot.next_input(&run.snapshot());
                run.step(input);
            }

            let mut surface = AsciiSurface::new(cols, rows);
            draw_frame(&run, &mut surface);
            let snapshot = run.snapshot();
            println!(
                "seed={} frame={} level={} lives={} pickups={} time={}s",
                seed_to_hex(seed),
                snapshot.frame_count,
                snapshot.level,
                snapshot.lives,
                snapshot.pickups,
                snapshot.seconds_left
            );
            print!("{}", surface.render());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
