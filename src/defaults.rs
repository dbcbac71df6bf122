//! Form default resolution.
//!
//! Starts from a hardcoded table of plausible operating values and overlays
//! per-feature means persisted by the preprocessing stage, when present. The
//! means file is re-read on every request and any failure degrades silently
//! to the hardcoded table.

use chrono::{Datelike, Local, Timelike};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::schema::FormValue;

/// Hardcoded fallback defaults covering every feature.
pub fn fallback_defaults() -> HashMap<String, FormValue> {
    let now = Local::now();
    let mut defaults = HashMap::new();

    // UI value; mapped through the operation-mode table at submit time
    defaults.insert(
        "Operation_Mode".to_string(),
        FormValue::Text("Active".to_string()),
    );

    // typical operating temperature
    defaults.insert("Temperature_C".to_string(), FormValue::Float(65.0));
    // nominal frequency
    defaults.insert("Vibration_Hz".to_string(), FormValue::Float(50.0));
    // mid-load power
    defaults.insert("Power_Consumption_kW".to_string(), FormValue::Float(35.0));
    // LAN-ish latency
    defaults.insert("Network_Latency_ms".to_string(), FormValue::Float(15.0));
    defaults.insert("Packet_Loss_%".to_string(), FormValue::Float(0.5));
    defaults.insert(
        "Quality_Control_Defect_Rate_%".to_string(),
        FormValue::Float(1.0),
    );
    defaults.insert(
        "Production_Speed_units_per_hr".to_string(),
        FormValue::Float(120.0),
    );
    // health score out of 100
    defaults.insert(
        "Predictive_Maintenance_Score".to_string(),
        FormValue::Float(55.0),
    );
    defaults.insert("Error_Rate_%".to_string(), FormValue::Float(0.8));

    defaults.insert("Year".to_string(), FormValue::Int(i64::from(now.year())));
    defaults.insert("Month".to_string(), FormValue::Int(i64::from(now.month())));
    defaults.insert("Day".to_string(), FormValue::Int(i64::from(now.day())));
    defaults.insert(
        "Hour".to_string(),
        FormValue::Int(i64::from(now.hour().min(23))),
    );

    defaults
}

/// Resolve the complete defaults map for one request.
///
/// Overlays any means-file entry whose key exists in the fallback table and
/// whose value is numeric. The categorical mode keeps its label so the form
/// always redisplays a valid choice. Missing file, unreadable file, and
/// malformed JSON all fall back to the hardcoded table in full.
pub fn resolve(means_path: &Path) -> HashMap<String, FormValue> {
    let mut merged = fallback_defaults();

    let text = match fs::read_to_string(means_path) {
        Ok(text) => text,
        Err(_) => return merged,
    };

    let means: HashMap<String, serde_json::Value> = match serde_json::from_str(&text) {
        Ok(means) => means,
        Err(err) => {
            tracing::debug!(
                path = %means_path.display(),
                error = %err,
                "Ignoring malformed feature-means file"
            );
            return merged;
        }
    };

    for (name, value) in means {
        let Some(current) = merged.get(&name) else {
            continue;
        };
        if matches!(current, FormValue::Text(_)) {
            continue;
        }
        if let Some(number) = value.as_f64() {
            merged.insert(name, FormValue::Float(number));
        }
    }

    merged
}
