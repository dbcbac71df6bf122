use crate::api::render::{self, RenderContext};
use crate::api::AppState;
use crate::defaults;
use axum::{extract::State, response::Html, Form, Json};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Pin the uptime clock to process start rather than the first health probe.
pub fn init_start_time() {
    Lazy::force(&START_TIME);
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Render the form pre-filled with resolved defaults, no prediction.
pub async fn show_form(State(state): State<AppState>) -> Html<String> {
    let values = defaults::resolve(&state.config.artifacts.means_path);

    Html(render::render_page(&RenderContext {
        prediction: None,
        values: &values,
    }))
}

/// Run one submission through the inference pipeline and re-render.
///
/// This is the single error boundary: every pipeline failure becomes a
/// display string, and the form always re-renders with whatever values
/// were successfully parsed before the failure.
pub async fn submit_form(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Html<String> {
    let mut values = defaults::resolve(&state.config.artifacts.means_path);

    let prediction = match state.pipeline.run(&form, &mut values) {
        Ok(label) => label,
        Err(err) => format!("Error: {}", err),
    };

    Html(render::render_page(&RenderContext {
        prediction: Some(&prediction),
        values: &values,
    }))
}
