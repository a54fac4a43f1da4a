use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Command, CommandFactory, Parser};
use simviz::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Plots fitness logs (one value per line) as a line chart.
#[derive(Parser, Debug)]
#[command(name = "plotter", version, about)]
struct Args {
    /// Fitness logs. An argument that cannot be read is skipped and, unless
    /// it starts with `-`, used as the legend title
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Show the chart in an image viewer instead of saving it
    #[arg(short = 's', long)]
    show: bool,

    #[arg(short, long, default_value = DEFAULT_CHART_PATH)]
    output: PathBuf,

    #[arg(long, default_value = "Generation")]
    x_label: String,

    #[arg(long, default_value = "Fitness")]
    y_label: String,

    #[arg(long)]
    caption: Option<String>,
}

impl Args {
    fn style(&self, legend_title: Option<String>) -> ChartStyle {
        ChartStyle {
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            caption: self.caption.clone(),
            legend_title: legend_title,
            ..ChartStyle::default()
        }
    }
}

/// Parses the command line with every argument that is not one of our
/// options moved behind `--`, so unknown dash arguments are tried as inputs
/// (and skipped) instead of failing the parse.
fn parse_args<I, T>(argv: I) -> std::result::Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut cmd = Args::command();
    cmd.build();

    let mut argv = argv.into_iter().map(Into::into);
    let mut options: Vec<OsString> = argv.next().into_iter().collect();
    let mut inputs = Vec::new();
    while let Some(arg) = argv.next() {
        if arg == "--" {
            inputs.extend(argv.by_ref());
            break;
        }
        match known_option(&cmd, &arg) {
            Some(takes_value) => {
                let inline = arg.to_str().map_or(false, |a| a.contains('='));
                options.push(arg);
                if takes_value && !inline {
                    options.extend(argv.next());
                }
            }
            None => inputs.push(arg),
        }
    }
    options.push(OsString::from("--"));
    options.extend(inputs);

    Args::try_parse_from(options)
}

/// `Some(takes_value)` when `arg` names one of the command's options.
fn known_option(cmd: &Command, arg: &OsStr) -> Option<bool> {
    let arg = arg.to_str()?;
    let found = if let Some(long) = arg.strip_prefix("--") {
        let name = long.split('=').next().unwrap_or(long);
        cmd.get_arguments().find(|a| a.get_long() == Some(name))
    } else if let Some(short) = arg.strip_prefix('-') {
        let mut chars = short.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => cmd.get_arguments().find(|a| a.get_short() == Some(c)),
            _ => None,
        }
    } else {
        None
    };
    found.map(|a| a.get_action().takes_values())
}

/// What a run produced.
#[derive(Debug)]
struct Plot {
    path: PathBuf,
    points: usize,
    series: SeriesSet,
}

fn run(args: &Args) -> Result<Plot> {
    let set = load_series(&args.inputs);
    if set.logs.is_empty() {
        warn!("none of the inputs could be read, the chart will be empty");
    }
    info!(
        series = set.logs.len(),
        skipped = set.skipped.len(),
        "plotting fitness logs"
    );

    let style = args.style(set.legend_title.clone());
    let (path, points) = if args.show {
        let path = show_fitness_chart(&set.logs, &style)?;
        (path, set.logs.iter().map(|l| l.len()).sum())
    } else {
        let points = save_fitness_chart(&args.output, &set.logs, &style)?;
        (args.output.clone(), points)
    };
    Ok(Plot {
        path: path,
        points: points,
        series: set,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("plotter=info".parse()?)
                .add_directive("simviz=info".parse()?),
        )
        .init();

    let args = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());
    let plot = run(&args)?;
    info!(
        points = plot.points,
        skipped = ?plot.series.skipped,
        "done"
    );
    println!("{}", plot.path.display());
    Ok(())
}
