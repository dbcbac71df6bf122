//! Shared fixtures: synthetic telemetry and trained artifacts.

use maintenance_predictor::config::ArtifactConfig;
use maintenance_predictor::training::{DataProcessing, ModelTraining};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Write a raw telemetry CSV with three well-separated classes.
pub fn write_telemetry_csv(path: &Path, n_rows: usize) {
    let mut csv = String::from(
        "Timestamp,Machine_ID,Operation_Mode,Temperature_C,Vibration_Hz,\
         Power_Consumption_kW,Network_Latency_ms,Packet_Loss_%,\
         Quality_Control_Defect_Rate_%,Production_Speed_units_per_hr,\
         Predictive_Maintenance_Score,Error_Rate_%,Efficiency_Status\n",
    );
    let modes = ["Idle", "Active", "Maintenance"];
    let statuses = ["High", "Low", "Medium"];

    for i in 0..n_rows {
        let class = i % 3;
        writeln!(
            csv,
            "2026-03-{:02} {:02}:00:00,M{},{},{},{},{},{},{},{},{},{},{},{}",
            (i % 28) + 1,
            i % 24,
            i,
            modes[class],
            55.0 + class as f64 * 20.0,
            40.0 + class as f64 * 12.0,
            28.0 + class as f64 * 6.0,
            10.0 + class as f64 * 4.0,
            0.3 + class as f64 * 0.4,
            0.9 + class as f64 * 0.5,
            130.0 - class as f64 * 15.0,
            70.0 - class as f64 * 20.0,
            0.5 + class as f64 * 0.6,
            statuses[class],
        )
        .unwrap();
    }

    fs::write(path, csv).unwrap();
}

/// Run the full training pipeline into `dir` and return the resulting
/// artifact locations.
pub fn train_fixture(dir: &Path) -> ArtifactConfig {
    let input = dir.join("data.csv");
    write_telemetry_csv(&input, 60);

    let processed_dir = dir.join("processed");
    let model_dir = dir.join("models");

    let dataset = DataProcessing::new(&input, &processed_dir).run().unwrap();
    ModelTraining::new(&model_dir).run(&dataset).unwrap();

    ArtifactConfig {
        model_path: model_dir.join("model.bin"),
        scaler_path: processed_dir.join("scaler.bin"),
        means_path: processed_dir.join("feature_means.json"),
    }
}
