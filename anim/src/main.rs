use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use simviz::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Renders a frame log into per-frame images and a looping GIF.
#[derive(Parser, Debug)]
#[command(name = "anim", version, about)]
struct Args {
    /// Frame log with one `(score, [[tile, ...], ...])` record per line
    frame_log: PathBuf,

    /// Directory for the per-frame images [default: system temp dir]
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Animation file [default: FRAME_LOG with a .gif extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Delay between animation frames in milliseconds
    #[arg(long, default_value_t = DEFAULT_FRAME_DELAY_MS)]
    delay: u32,

    #[arg(long, default_value_t = 20)]
    tile_size: u32,

    #[arg(long, default_value_t = 400)]
    width: u32,

    #[arg(long, default_value_t = 440)]
    height: u32,

    /// Leave out the frame index and score footer
    #[arg(long)]
    no_footer: bool,
}

impl Args {
    fn layout(&self) -> FrameLayout {
        FrameLayout {
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            footer: !self.no_footer,
            ..FrameLayout::default()
        }
    }

    fn gif_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.frame_log.with_extension("gif"))
    }

    fn frames_dir(&self) -> PathBuf {
        self.frames_dir.clone().unwrap_or_else(env::temp_dir)
    }
}

fn run(args: &Args) -> Result<Animation> {
    let log = FrameLog::read(&args.frame_log)
        .with_context(|| format!("failed to read frame log {}", args.frame_log.display()))?;
    if log.skipped > 0 {
        warn!(skipped = log.skipped, "malformed frame records were left out");
    }
    info!(frames = log.len(), "rendering {}", args.frame_log.display());

    let animation = render_animation(
        &log,
        &args.frames_dir(),
        &args.gif_path(),
        &args.layout(),
        args.delay,
    )?;
    Ok(animation)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("anim=info".parse()?)
                .add_directive("simviz=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let animation = run(&args)?;
    println!("{}", animation.gif.display());
    Ok(())
}
