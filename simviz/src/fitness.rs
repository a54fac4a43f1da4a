use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{Result, VizError};

/// One value per generation, labelled with the file it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct FitnessLog {
    pub label: String,
    pub values: Vec<f64>,
}

impl FitnessLog {
    pub fn new<S: Into<String>>(label: S, values: Vec<f64>) -> Self {
        FitnessLog {
            label: label.into(),
            values: values,
        }
    }

    /// Reads a whole log. Any line that is not a number fails the file.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<FitnessLog> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| VizError::io(path, e))?;
        let values = parse_values(&text)?;
        debug!(path = %path.display(), values = values.len(), "read fitness log");
        Ok(FitnessLog::new(path.display().to_string(), values))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(generation, value)` pairs, one per logged value.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| (i as f64, *v))
    }
}

pub fn parse_values(text: &str) -> Result<Vec<f64>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            let value = line.trim();
            value.parse::<f64>().map_err(|source| VizError::Number {
                line: i + 1,
                value: value.to_string(),
                source: source,
            })
        })
        .collect()
}

/// Everything gathered from the plotter's input arguments.
#[derive(Clone, Debug, Default)]
pub struct SeriesSet {
    pub logs: Vec<FitnessLog>,
    pub legend_title: Option<String>,
    pub skipped: Vec<String>,
}

/// Tries every argument as a fitness log. Arguments that cannot be read are
/// skipped; the last skipped one not starting with `-` becomes the legend
/// title.
pub fn load_series<I, S>(inputs: I) -> SeriesSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut set = SeriesSet::default();
    for input in inputs {
        let arg = input.as_ref();
        match FitnessLog::read(arg) {
            Ok(log) => set.logs.push(log),
            Err(err) => {
                if !arg.starts_with('-') {
                    set.legend_title = Some(arg.to_string());
                }
                warn!(error = %err, "skipping {}", arg);
                set.skipped.push(arg.to_string());
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_log(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_parse_values() {
        let values = parse_values("1\n2.5\n  -3e1 \n\n4\n").unwrap();
        assert_eq!(values, vec![1.0, 2.5, -30.0, 4.0]);
    }

    #[test]
    fn test_parse_values_rejects_garbage() {
        match parse_values("1\n2\nthree\n").unwrap_err() {
            VizError::Number { line, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(value, "three");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_points_one_per_value() {
        let log = FitnessLog::new("run", vec![0.5, 0.75, 0.9]);
        let points = log.points().collect::<Vec<_>>();
        assert_eq!(points, vec![(0.0, 0.5), (1.0, 0.75), (2.0, 0.9)]);
    }

    #[test]
    fn test_read_fitness_log() {
        let dir = tempfile::tempdir().unwrap();
        let contents = (0..50).map(|i| format!("{}\n", i * 2)).collect::<String>();
        let path = write_log(dir.path(), "fitness.txt", &contents);

        let log = FitnessLog::read(&path).unwrap();
        assert_eq!(log.label, path);
        assert_eq!(log.len(), 50);
        assert_eq!(log.points().count(), 50);
    }

    #[test]
    fn test_load_series_skips_bad_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let good1 = write_log(dir.path(), "a.txt", "1\n2\n3\n");
        let bad = write_log(dir.path(), "bad.txt", "1\noops\n");
        let good2 = write_log(dir.path(), "b.txt", "4\n5\n");

        let set = load_series(vec![
            good1.clone(),
            bad.clone(),
            "Mutation rate".to_string(),
            good2.clone(),
        ]);

        assert_eq!(
            set.logs.iter().map(|l| l.label.clone()).collect::<Vec<_>>(),
            vec![good1, good2]
        );
        assert_eq!(set.skipped, vec![bad, "Mutation rate".to_string()]);
        assert_eq!(set.legend_title, Some("Mutation rate".to_string()));
    }

    #[test]
    fn test_load_series_dash_args_are_not_titles() {
        let set = load_series(&["-x"]);
        assert!(set.logs.is_empty());
        assert_eq!(set.legend_title, None);
        assert_eq!(set.skipped, vec!["-x".to_string()]);
    }
}
