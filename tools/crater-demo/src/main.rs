//! crater-demo: run a scripted grenade throw in the demo arena.
//!
//! Usage:
//!   crater-demo run --throw -2,3 --velocity 4,2 --ticks 600
//!   crater-demo run --config match.json --heightfield
//!   crater-demo config > match.json

use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use crater_core::config::MatchConfig;
use crater_core::constants::TICK_RATE;
use crater_core::events::MatchEvent;
use crater_core::types::Vec2;
use crater_sim::{world_setup, MatchEngine};
use crater_terrain::{Heightfield, HeightfieldHeader};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "config" => cmd_config(),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "crater-demo: destructible terrain sandbox\n\
         \n\
         Commands:\n\
         \n\
         run       Throw a grenade in the demo arena and print events as JSON lines\n\
         \n\
           --config <path>     Match config JSON (optional, default: built-in)\n\
           --throw <x,y>       Throw origin (default: -2,3)\n\
           --velocity <vx,vy>  Throw velocity (default: 4,2)\n\
           --ticks <N>         Ticks to simulate (default: 600)\n\
           --heightfield       Attach a flat heightfield that takes craters first\n\
         \n\
         config    Print the default match config as JSON\n\
         \n\
         RUST_LOG controls log verbosity, e.g. RUST_LOG=crater_sim=debug\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_vec2(args: &[String], flag: &str, default: Vec2) -> Result<Vec2> {
    let Some(raw) = flag_value(args, flag) else {
        return Ok(default);
    };
    let parts: Vec<&str> = raw.split(',').collect();
    if parts.len() != 2 {
        bail!("{flag} expects x,y but got {raw:?}");
    }
    let x: f32 = parts[0].trim().parse().with_context(|| format!("{flag}: bad x"))?;
    let y: f32 = parts[1].trim().parse().with_context(|| format!("{flag}: bad y"))?;
    Ok(Vec2::new(x, y))
}

fn cmd_run(args: &[String]) -> Result<()> {
    let config = match flag_value(args, "--config") {
        Some(path) => {
            let path = PathBuf::from(path);
            MatchConfig::from_json_file(&path)
                .with_context(|| format!("loading config {}", path.display()))?
        }
        None => MatchConfig::default(),
    };
    let origin = parse_vec2(args, "--throw", Vec2::new(-2.0, 3.0))?;
    let velocity = parse_vec2(args, "--velocity", Vec2::new(4.0, 2.0))?;
    let ticks: u64 = match flag_value(args, "--ticks") {
        Some(raw) => raw.parse().with_context(|| format!("--ticks: bad count {raw:?}"))?,
        None => 600,
    };

    let arena = world_setup::demo_arena().context("building demo arena")?;
    let mut engine = MatchEngine::new(config, arena);
    if args.iter().any(|a| a == "--heightfield") {
        let header = HeightfieldHeader {
            origin_x: -20.0,
            cell_width: 0.5,
            floor: -3.0,
        };
        let field = Heightfield::new(header, vec![0.0; 81], engine.config().heightfield_depth_ratio)
            .context("building heightfield")?;
        engine = engine.with_heightfield(field);
    }

    let grenade = engine.throw_grenade(origin, velocity);
    tracing::info!(?grenade, ticks, "simulating");

    let mut detonations = 0;
    for _ in 0..ticks {
        for event in engine.tick() {
            if matches!(event, MatchEvent::Detonated { .. }) {
                detonations += 1;
            }
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    tracing::info!(
        detonations,
        secs = engine.time().tick as f32 / TICK_RATE as f32,
        "done"
    );
    Ok(())
}

fn cmd_config() -> Result<()> {
    let json = serde_json::to_string_pretty(&MatchConfig::default())?;
    println!("{json}");
    Ok(())
}
