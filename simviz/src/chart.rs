use std::env;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::process::Command;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::info;

use crate::error::{Result, VizError};
use crate::fitness::FitnessLog;

pub const DEFAULT_CHART_PATH: &str = "out-graph.png";

#[derive(Clone, Debug, PartialEq)]
pub struct ChartStyle {
    pub size: (u32, u32),
    pub x_label: String,
    pub y_label: String,
    pub caption: Option<String>,
    pub legend_title: Option<String>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        ChartStyle {
            size: (640, 480),
            x_label: String::from("Generation"),
            y_label: String::from("Fitness"),
            caption: None,
            legend_title: None,
        }
    }
}

/// Axis ranges covering every finite point of every series, with a 5%
/// margin on the value axis.
pub fn chart_ranges(series: &[FitnessLog]) -> (Range<f64>, Range<f64>) {
    let longest = series.iter().map(|s| s.len()).max().unwrap_or(0);
    let x_max = (longest.max(2) - 1) as f64;

    let finite = series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .filter(|v| v.is_finite());
    let (y_min, y_max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let (y_min, y_max) = if y_min > y_max {
        (0.0, 1.0)
    } else if y_min == y_max {
        let pad = if y_min == 0.0 { 1.0 } else { y_min.abs() * 0.05 };
        (y_min - pad, y_max + pad)
    } else {
        let pad = (y_max - y_min) * 0.05;
        (y_min - pad, y_max + pad)
    };

    (0.0..x_max, y_min..y_max)
}

/// Draws one line per log and returns the number of points plotted.
pub fn draw_fitness_chart<DB: DrawingBackend>(
    drawing_area: &DrawingArea<DB, Shift>,
    series: &[FitnessLog],
    style: &ChartStyle,
) -> Result<usize> {
    drawing_area.fill(&WHITE)?;

    let (x_range, y_range) = chart_ranges(series);
    let mut builder = ChartBuilder::on(drawing_area);
    builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(caption) = &style.caption {
        builder.caption(caption, ("sans-serif", 20));
    }
    let mut chart = builder.build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .bold_line_style(&WHITE.mix(0.3))
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    // legend title goes in as an entry without a line so it heads the box
    if let Some(title) = &style.legend_title {
        chart
            .draw_series(LineSeries::new(std::iter::empty::<(f64, f64)>(), &WHITE))?
            .label(title.as_str());
    }

    let mut plotted = 0;
    for (i, log) in series.iter().enumerate() {
        let color = Palette99::pick(i).mix(0.9);
        plotted += log.len();
        chart
            .draw_series(LineSeries::new(log.points(), &color))?
            .label(log.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &color));
    }

    if !series.is_empty() || style.legend_title.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::LowerRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    Ok(plotted)
}

pub fn save_fitness_chart<P: AsRef<Path>>(
    path: P,
    series: &[FitnessLog],
    style: &ChartStyle,
) -> Result<usize> {
    let path = path.as_ref();
    let root = BitMapBackend::new(path, style.size).into_drawing_area();
    let plotted = draw_fitness_chart(&root, series, style)?;
    root.present()?;

    info!(
        path = %path.display(),
        series = series.len(),
        points = plotted,
        "saved fitness chart"
    );
    Ok(plotted)
}

/// Renders to a scratch file and opens it in the desktop image viewer.
pub fn show_fitness_chart(series: &[FitnessLog], style: &ChartStyle) -> Result<PathBuf> {
    let path = scratch_chart_path()?;
    save_fitness_chart(&path, series, style)?;

    viewer_command(&path)
        .spawn()
        .map_err(|source| VizError::Viewer {
            path: path.clone(),
            source: source,
        })?;
    Ok(path)
}

// Kept on disk: the viewer is not waited for and reads the file later.
fn scratch_chart_path() -> Result<PathBuf> {
    let dir = env::temp_dir();
    tempfile::Builder::new()
        .prefix("simviz-fitness-")
        .suffix(".png")
        .tempfile_in(&dir)
        .map_err(|e| VizError::io(&dir, e))?
        .into_temp_path()
        .keep()
        .map_err(|e| VizError::io(&dir, e.error))
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(&["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const W: u32 = 640;
    const H: u32 = 480;

    fn render(series: &[FitnessLog], style: &ChartStyle) -> (usize, Vec<u8>) {
        let mut buf = vec![0u8; (W * H * 3) as usize];
        let plotted;
        {
            let root = BitMapBackend::with_buffer(&mut buf, (W, H)).into_drawing_area();
            plotted = draw_fitness_chart(&root, series, style).unwrap();
            root.present().unwrap();
        }
        (plotted, buf)
    }

    fn inked(buf: &[u8], xs: Range<u32>, ys: Range<u32>) -> usize {
        ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
            .filter(|(x, y)| {
                let i = ((y * W + x) * 3) as usize;
                buf[i..i + 3].iter().any(|&c| c != 255)
            })
            .count()
    }

    fn ramp(label: &str, n: usize) -> FitnessLog {
        FitnessLog::new(label, (0..n).map(|i| (i * i) as f64).collect())
    }

    #[test]
    fn test_draw_chart_single_series() {
        let style = ChartStyle::default();
        let (plotted, buf) = render(&[ramp("run1.txt", 30)], &style);
        assert_eq!(plotted, 30);

        let (_, empty) = render(&[], &style);
        assert!(inked(&buf, 0..W, 0..H) > inked(&empty, 0..W, 0..H));
    }

    #[test]
    fn test_draw_chart_several_series_with_title() {
        let series = vec![ramp("run1.txt", 10), ramp("run2.txt", 20)];
        let untitled = ChartStyle::default();
        let titled = ChartStyle {
            legend_title: Some(String::from("Crossover rate")),
            ..ChartStyle::default()
        };

        let (plotted, plain) = render(&series, &untitled);
        assert_eq!(plotted, 30);
        let (plotted, with_title) = render(&series, &titled);
        assert_eq!(plotted, 30);

        // the legend sits lower right and grows by one entry for the title
        let legend = |buf: &[u8]| inked(buf, W / 2..W, H / 2..H);
        assert!(legend(&with_title) > legend(&plain));
    }

    #[test]
    fn test_draw_chart_without_series() {
        let (plotted, buf) = render(&[], &ChartStyle::default());
        assert_eq!(plotted, 0);
        // axes and labels are still drawn
        assert!(inked(&buf, 0..W, 0..H) > 0);

        let title_only = ChartStyle {
            legend_title: Some(String::from("Elitism")),
            ..ChartStyle::default()
        };
        let (plotted, _) = render(&[], &title_only);
        assert_eq!(plotted, 0);
    }

    #[test]
    fn test_save_fitness_chart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out-graph.png");
        let plotted = save_fitness_chart(&path, &[ramp("run.txt", 25)], &ChartStyle::default())
            .unwrap();
        assert_eq!(plotted, 25);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    #[test]
    fn test_scratch_chart_paths_are_unique() {
        let first = scratch_chart_path().unwrap();
        let second = scratch_chart_path().unwrap();
        assert_ne!(first, second);
        for path in &[&first, &second] {
            assert!(path.is_file());
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
            fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_chart_style_defaults() {
        let style = ChartStyle::default();
        assert_eq!(style.x_label, "Generation");
        assert_eq!(style.y_label, "Fitness");
        assert_eq!(style.legend_title, None);
    }

    #[test]
    fn test_chart_ranges_cover_all_series() {
        let series = vec![
            FitnessLog::new("a", vec![1.0, 3.0, 2.0]),
            FitnessLog::new("b", vec![0.0, 11.0, 4.0, 5.0, 6.0]),
        ];
        let (x, y) = chart_ranges(&series);
        assert_eq!(x, 0.0..4.0);
        assert!(y.start < 0.0 && y.start > -1.0);
        assert!(y.end > 11.0 && y.end < 12.0);
    }

    #[test]
    fn test_chart_ranges_degenerate() {
        assert_eq!(chart_ranges(&[]), (0.0..1.0, 0.0..1.0));

        let flat = vec![FitnessLog::new("flat", vec![0.0])];
        assert_eq!(chart_ranges(&flat), (0.0..1.0, -1.0..1.0));

        let nan = vec![FitnessLog::new("nan", vec![f64::NAN, 2.0, 2.0])];
        let (_, y) = chart_ranges(&nan);
        assert!(y.start < 2.0 && y.end > 2.0);
    }

    #[test]
    fn test_viewer_command_targets_chart() {
        let path = Path::new("chart.png");
        let cmd = viewer_command(path);
        assert!(cmd.get_args().any(|a| a == path.as_os_str()));
    }
}
