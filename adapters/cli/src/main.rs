#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Sprite Chase experience.

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use sprite_chase_core::{ConfigOverrides, CoordinateMode, GameConfig, Seed};
use sprite_chase_display::synthetic::{InputScript, SyntheticDisplay};
use sprite_chase_display_macroquad::{run_window, WindowOptions};
use sprite_chase_runtime::{resolve_seed, GameLoop, RunLimit};
use sprite_chase_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Command-line arguments accepted by the Sprite Chase binary.
#[derive(Debug, Parser)]
#[command(
    name = "sprite-chase",
    about = "Chase a target sprite around a handheld-sized display."
)]
struct CliArgs {
    /// Game variant to start from before applying the config file.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// TOML file overriding any part of the preset.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Fixed seed for target placement.
    #[arg(long)]
    seed: Option<u64>,
    /// Frames between motion commits.
    #[arg(long)]
    speed: Option<u32>,
    /// Runs without a window on a scripted display.
    #[arg(long)]
    headless: bool,
    /// Stops after this many frames.
    #[arg(long, value_name = "COUNT")]
    frames: Option<u64>,
    /// Buttons fed to a headless run, e.g. `right*90,up*60`.
    #[arg(long, value_name = "SCRIPT", requires = "headless")]
    script: Option<InputScript>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Grid,
    Pixel,
}

impl From<ModeArg> for CoordinateMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Grid => Self::Grid,
            ModeArg::Pixel => Self::Pixel,
        }
    }
}

/// Entry point for the Sprite Chase command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let config = build_config(&args)?;
    let seed = resolve_seed(config.seed);
    let mut game = GameLoop::new(config, seed).context("invalid game configuration")?;
    info!(
        mode = ?game.config().mode,
        speed = game.config().speed,
        seed = game.seed(),
        "session_configured"
    );
    println!("{}", query::welcome_banner(game.world()));

    let summary = if args.headless {
        let script = args.script.unwrap_or_default();
        let limit = headless_limit(args.frames, &script)?;
        let mut display = SyntheticDisplay::new(script);
        game.run(&mut display, limit)
    } else {
        let limit = args.frames.map_or(RunLimit::Forever, RunLimit::Frames);
        run_window(WindowOptions::default(), move |mut display| {
            game.run(&mut display, limit)
        })
        .context("desktop window failed")?
    };

    info!(frames = summary.frames, score = summary.score, "session_finished");
    println!("frames={} score={}", summary.frames, summary.score);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn build_config(args: &CliArgs) -> Result<GameConfig> {
    let mut overrides = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str::<ConfigOverrides>(&text)
                .with_context(|| format!("failed to parse config file {}", path.display()))?
        }
        None => ConfigOverrides::default(),
    };

    if let Some(mode) = args.mode {
        overrides.mode = Some(mode.into());
    }
    if let Some(speed) = args.speed {
        overrides.speed = Some(speed);
    }
    if let Some(seed) = args.seed {
        overrides.seed = Some(Seed::Fixed(seed));
    }

    Ok(GameConfig::from_overrides(CoordinateMode::Grid, &overrides))
}

fn headless_limit(frames: Option<u64>, script: &InputScript) -> Result<RunLimit> {
    match frames {
        Some(frames) => Ok(RunLimit::Frames(frames)),
        None if script.len_frames() > 0 => Ok(RunLimit::Frames(script.len_frames())),
        None => bail!("headless runs need --frames or a non-empty --script"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprite_chase_core::Position;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("sprite-chase").chain(args.iter().copied()))
            .expect("valid arguments")
    }

    #[test]
    fn defaults_to_grid_preset() {
        let config = build_config(&parse(&[])).expect("config");
        assert_eq!(config, GameConfig::grid());
    }

    #[test]
    fn flags_override_the_preset() {
        let args = parse(&["--mode", "pixel", "--speed", "3", "--seed", "9"]);
        let config = build_config(&args).expect("config");
        assert_eq!(config.mode, CoordinateMode::Pixel);
        assert_eq!(config.speed, 3);
        assert_eq!(config.seed, Seed::Fixed(9));
        assert_eq!(config.field, GameConfig::pixel().field);
    }

    #[test]
    fn config_file_is_layered_under_flags() {
        let path = std::env::temp_dir().join(format!(
            "sprite-chase-cli-{}-layered.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            "mode = \"pixel\"\nspeed = 7\ntarget_start = { x = 10, y = 10 }\n",
        )
        .expect("write config");

        let path_arg = path.to_string_lossy().into_owned();
        let config =
            build_config(&parse(&["--config", &path_arg, "--speed", "2"])).expect("config");
        let _ = fs::remove_file(&path);

        assert_eq!(config.mode, CoordinateMode::Pixel);
        assert_eq!(config.speed, 2);
        assert_eq!(config.target_start, Some(Position::new(10, 10)));
    }

    #[test]
    fn missing_config_file_reports_its_path() {
        let error = build_config(&parse(&["--config", "/nonexistent/sprite-chase.toml"]))
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/sprite-chase.toml"));
    }

    #[test]
    fn script_requires_headless() {
        assert!(CliArgs::try_parse_from(["sprite-chase", "--script", "up"]).is_err());
    }

    #[test]
    fn headless_limit_falls_back_to_script_length() {
        let script: InputScript = "right*90,up*60".parse().expect("script");
        assert_eq!(
            headless_limit(None, &script).expect("limit"),
            RunLimit::Frames(150)
        );
        assert_eq!(
            headless_limit(Some(10), &script).expect("limit"),
            RunLimit::Frames(10)
        );
        assert!(headless_limit(None, &InputScript::new()).is_err());
    }
}
