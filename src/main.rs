//! Maze Trail - headless session driver.
//!
//! Plays a number of levels with the built-in autopilot standing in for a pointer or hand
//! tracker, and prints each level result plus the session statistics. By default time is
//! simulated (every frame advances a manual clock by one tick interval); `--realtime`
//! uses the system clock and sleeps between frames instead.
//!
//! # Usage
//! ```text
//! maze-trail --levels 5 --seed 42
//! RUST_LOG=debug maze-trail --levels 1 --width 720 --height 720
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::{info, warn};
use maze_trail::game::score::{format_distance, format_score, format_time};
use maze_trail::game::{Autopilot, Clock, LevelResult, ManualClock, SurfaceExtent, SystemClock};
use maze_trail::{AppContext, GameConfig, RunState};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

/// CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file overriding game constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of levels to play
    #[arg(short, long, default_value = "3")]
    levels: u32,

    /// Rendering surface width
    #[arg(short = 'W', long, default_value = "720")]
    width: f32,

    /// Rendering surface height
    #[arg(short = 'H', long, default_value = "720")]
    height: f32,

    /// Maze generation seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, default_value = "autopilot")]
    player_name: String,

    /// Give up on a level after this many frames
    #[arg(long, default_value = "200000")]
    max_ticks: u64,

    /// Use the system clock and sleep between frames
    #[arg(long)]
    realtime: bool,
}

fn main() -> Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate().context("invalid configuration")?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))
            .context("installing Ctrl-C handler")?;
    }

    let manual_clock = ManualClock::new();
    let clock: Rc<dyn Clock> = if args.realtime {
        Rc::new(SystemClock)
    } else {
        Rc::new(manual_clock.clone())
    };
    let tick_interval = config.tick_interval();

    let mut app = AppContext::new(config, SurfaceExtent::new(args.width, args.height), clock)?;
    app.subscribe(print_result);

    let mut pilot = Autopilot::default();
    app.start_game(&args.player_name)?;

    'levels: for level in 1..=args.levels {
        if level > 1 {
            app.next_level()?;
        }
        if let Some(maze) = app.runner().maze() {
            let (width, height) = maze.dimensions();
            info!(
                "Surface resized to {}x{} for level {}",
                width, height, level
            );
        }

        let mut frames = 0u64;
        while app.run_state() == RunState::Running {
            if !running.load(Ordering::SeqCst) {
                warn!("Interrupted during level {}", level);
                break 'levels;
            }
            if frames >= args.max_ticks {
                bail!("level {} not finished after {} frames", level, frames);
            }

            if args.realtime {
                std::thread::sleep(Duration::from_secs_f32(tick_interval));
            } else {
                manual_clock.advance_secs(f64::from(tick_interval));
            }
            app.frame(&mut pilot)?;
            frames += 1;
        }
    }
    app.shutdown();

    let stats = app.session_stats();
    println!();
    println!("Session summary for {}", app.score().player_name());
    println!("  Levels completed: {}", stats.total_levels);
    println!("  Total time:       {}", format_time(stats.total_time));
    println!(
        "  Total distance:   {}",
        format_distance(stats.total_distance)
    );
    println!("  Average score:    {}", format_score(stats.average_score));
    println!("  Best score:       {}", format_score(stats.best_score));
    Ok(())
}

fn print_result(result: &LevelResult) {
    println!(
        "Level {:>2}  time {:>7}  distance {:>6}  score {:>5}  best {:>5}",
        result.level,
        format_time(result.elapsed_time),
        format_distance(result.distance),
        format_score(result.score),
        format_score(result.best_score)
    );
}
