use chrono::{Datelike, NaiveDateTime, Timelike};
use ndarray::{s, Array2};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::artifacts::StandardScaler;
use crate::error::{AppError, Result};
use crate::schema::{self, FieldKind};

/// Column holding the record timestamp, expanded into Year/Month/Day/Hour.
const TIMESTAMP_COLUMN: &str = "Timestamp";

/// Column holding the maintenance-urgency target.
const TARGET_COLUMN: &str = "Efficiency_Status";

/// Fraction of rows held out for evaluation.
const TEST_FRACTION: f64 = 0.2;

/// One split of the processed dataset.
#[derive(Debug)]
pub struct DataSplit {
    pub features: Array2<f64>,
    pub labels: Vec<usize>,
}

/// Scaled features and encoded labels, ready for training.
#[derive(Debug)]
pub struct ProcessedDataset {
    pub train: DataSplit,
    pub test: DataSplit,
}

/// Pipeline stage 1: raw telemetry CSV to scaled train/test splits, with
/// the fitted scaler and per-feature means persisted alongside.
pub struct DataProcessing {
    input_path: PathBuf,
    output_path: PathBuf,
}

impl DataProcessing {
    pub fn new(input_path: &Path, output_path: &Path) -> Self {
        Self {
            input_path: input_path.to_path_buf(),
            output_path: output_path.to_path_buf(),
        }
    }

    pub fn run(&self) -> Result<ProcessedDataset> {
        tracing::info!(input = %self.input_path.display(), "Loading raw telemetry");
        let text = fs::read_to_string(&self.input_path)?;

        let (rows, labels) = parse_rows(&text)?;
        tracing::info!(n_rows = rows.len(), "Parsed telemetry rows");

        if rows.len() < 10 {
            return Err(AppError::TrainingData(format!(
                "only {} usable rows, need at least 10",
                rows.len()
            )));
        }

        fs::create_dir_all(&self.output_path)?;

        // Per-feature means, persisted for form defaults
        let means = feature_means(&rows);
        let means_path = self.output_path.join("feature_means.json");
        fs::write(&means_path, serde_json::to_string_pretty(&means)?)?;
        tracing::info!(path = %means_path.display(), "Feature means saved");

        // Unshuffled split: leading rows train, trailing rows test
        let n_test = (rows.len() as f64 * TEST_FRACTION) as usize;
        let n_train = rows.len() - n_test;

        let matrix = to_matrix(&rows);
        let train_raw = matrix.slice(s![..n_train, ..]).to_owned();
        let test_raw = matrix.slice(s![n_train.., ..]).to_owned();

        let names: Vec<&str> = schema::FEATURES.to_vec();
        let scaler = StandardScaler::fit(&names, &train_raw)?;

        let train_features = scaler.transform(&train_raw)?;
        let test_features = scaler.transform(&test_raw)?;

        let scaler_path = self.output_path.join("scaler.bin");
        scaler.save(&scaler_path)?;
        tracing::info!(path = %scaler_path.display(), "Scaler fitted and saved");

        Ok(ProcessedDataset {
            train: DataSplit {
                features: train_features,
                labels: labels[..n_train].to_vec(),
            },
            test: DataSplit {
                features: test_features,
                labels: labels[n_train..].to_vec(),
            },
        })
    }
}

/// Parse the CSV into schema-ordered feature rows and encoded labels.
///
/// Rows with a bad timestamp, an unknown mode or status, or a non-numeric
/// sensor value are skipped with a warning rather than failing the run.
fn parse_rows(text: &str) -> Result<(Vec<Vec<f64>>, Vec<usize>)> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| AppError::TrainingData("empty input file".to_string()))?;

    let columns: HashMap<&str, usize> = header
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(idx, name)| (name, idx))
        .collect();

    let column = |name: &str| -> Result<usize> {
        columns
            .get(name)
            .copied()
            .ok_or_else(|| AppError::TrainingData(format!("missing column '{}'", name)))
    };

    let timestamp_col = column(TIMESTAMP_COLUMN)?;
    let target_col = column(TARGET_COLUMN)?;

    // Sensor columns must all be present; temporal slots come from the
    // timestamp instead
    let mut sensor_cols: HashMap<&str, usize> = HashMap::new();
    for descriptor in schema::descriptors() {
        if matches!(descriptor.name, "Year" | "Month" | "Day" | "Hour") {
            continue;
        }
        sensor_cols.insert(descriptor.name, column(descriptor.name)?);
    }

    let mut rows = Vec::new();
    let mut labels = Vec::new();
    let mut skipped = 0usize;

    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        match parse_row(&fields, timestamp_col, target_col, &sensor_cols) {
            Ok((row, label)) => {
                rows.push(row);
                labels.push(label);
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!(line = line_no + 2, error = %err, "Skipping row");
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "Dropped unusable rows");
    }

    Ok((rows, labels))
}

fn parse_row(
    fields: &[&str],
    timestamp_col: usize,
    target_col: usize,
    sensor_cols: &HashMap<&str, usize>,
) -> Result<(Vec<f64>, usize)> {
    let field = |idx: usize| -> Result<&str> {
        fields
            .get(idx)
            .copied()
            .ok_or_else(|| AppError::TrainingData(format!("short row, missing column {}", idx)))
    };

    let timestamp = NaiveDateTime::parse_from_str(field(timestamp_col)?, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| AppError::TrainingData(format!("bad timestamp: {}", e)))?;

    let status = field(target_col)?;
    let label = schema::LABELS
        .iter()
        .position(|l| *l == status)
        .ok_or_else(|| AppError::TrainingData(format!("unknown status '{}'", status)))?;

    let mut row = Vec::with_capacity(schema::FEATURE_COUNT);
    for descriptor in schema::descriptors() {
        let value = match descriptor.name {
            "Year" => f64::from(timestamp.year()),
            "Month" => f64::from(timestamp.month()),
            "Day" => f64::from(timestamp.day()),
            "Hour" => f64::from(timestamp.hour()),
            name => descriptor.parse(field(sensor_cols[name])?)?,
        };
        row.push(value);
    }

    Ok((row, label))
}

/// Means of the numeric features, keyed by feature name.
fn feature_means(rows: &[Vec<f64>]) -> HashMap<String, f64> {
    let n = rows.len() as f64;
    schema::descriptors()
        .iter()
        .enumerate()
        .filter(|(_, d)| d.kind == FieldKind::Numeric)
        .map(|(slot, d)| {
            let sum: f64 = rows.iter().map(|row| row[slot]).sum();
            (d.name.to_string(), sum / n)
        })
        .collect()
}

fn to_matrix(rows: &[Vec<f64>]) -> Array2<f64> {
    let mut matrix = Array2::zeros((rows.len(), schema::FEATURE_COUNT));
    for (i, row) in rows.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            matrix[[i, j]] = value;
        }
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write as _;

    fn raw_csv(n_rows: usize) -> String {
        let mut csv = String::from(
            "Timestamp,Machine_ID,Operation_Mode,Temperature_C,Vibration_Hz,\
             Power_Consumption_kW,Network_Latency_ms,Packet_Loss_%,\
             Quality_Control_Defect_Rate_%,Production_Speed_units_per_hr,\
             Predictive_Maintenance_Score,Error_Rate_%,Efficiency_Status\n",
        );
        let modes = ["Idle", "Active", "Maintenance"];
        let statuses = ["High", "Low", "Medium"];
        for i in 0..n_rows {
            writeln!(
                csv,
                "2026-03-{:02} {:02}:00:00,M{},{},{},{},{},{},{},{},{},{},{},{}",
                (i % 28) + 1,
                i % 24,
                i,
                modes[i % 3],
                60.0 + i as f64,
                45.0 + i as f64,
                30.0,
                12.0,
                0.4,
                1.1,
                118.0,
                52.0,
                0.7,
                statuses[i % 3],
            )
            .unwrap();
        }
        csv
    }

    #[test]
    fn test_run_produces_splits_and_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, raw_csv(50)).unwrap();

        let processed_dir = dir.path().join("processed");
        let dataset = DataProcessing::new(&input, &processed_dir).run().unwrap();

        assert_eq!(dataset.train.features.nrows(), 40);
        assert_eq!(dataset.test.features.nrows(), 10);
        assert_eq!(dataset.train.features.ncols(), schema::FEATURE_COUNT);
        assert_eq!(dataset.train.labels.len(), 40);

        assert!(processed_dir.join("scaler.bin").exists());
        assert!(processed_dir.join("feature_means.json").exists());

        let loaded = StandardScaler::load(&processed_dir.join("scaler.bin")).unwrap();
        assert_eq!(loaded.n_features(), schema::FEATURE_COUNT);
    }

    #[test]
    fn test_means_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, raw_csv(20)).unwrap();

        let processed_dir = dir.path().join("processed");
        DataProcessing::new(&input, &processed_dir).run().unwrap();

        let text = fs::read_to_string(processed_dir.join("feature_means.json")).unwrap();
        let means: HashMap<String, f64> = serde_json::from_str(&text).unwrap();

        // Temperature_C was 60 + i for i in 0..20, mean 69.5
        assert!((means["Temperature_C"] - 69.5).abs() < 1e-9);
        // The categorical feature is not a numeric mean
        assert!(!means.contains_key("Operation_Mode"));
        assert!(means.contains_key("Hour"));
    }

    #[test]
    fn test_bad_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");

        let mut csv = raw_csv(15);
        csv.push_str("not-a-timestamp,M99,Active,60,45,30,12,0.4,1.1,118,52,0.7,High\n");
        csv.push_str("2026-03-01 10:00:00,M98,Warp,60,45,30,12,0.4,1.1,118,52,0.7,High\n");
        fs::write(&input, csv).unwrap();

        let dataset = DataProcessing::new(&input, &dir.path().join("processed"))
            .run()
            .unwrap();
        let total = dataset.train.features.nrows() + dataset.test.features.nrows();
        assert_eq!(total, 15);
    }

    #[test]
    fn test_missing_column_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, "Timestamp,Operation_Mode\n").unwrap();

        let err = DataProcessing::new(&input, &dir.path().join("processed"))
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("missing column"));
    }

    #[test]
    fn test_too_few_rows_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        fs::write(&input, raw_csv(5)).unwrap();

        let err = DataProcessing::new(&input, &dir.path().join("processed"))
            .run()
            .unwrap_err();
        assert!(err.to_string().contains("at least 10"));
    }
}
