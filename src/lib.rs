//! Predictive-maintenance inference service.
//!
//! Loads a pre-fitted scaler and decision-tree classifier at startup and
//! serves a single-page form that turns submitted machine telemetry into a
//! maintenance-urgency label ("High"/"Medium"/"Low"). The `mp-train`
//! binary runs the end-to-end pipeline that produces the artifacts.

pub mod api;
pub mod artifacts;
pub mod config;
pub mod defaults;
pub mod error;
pub mod inference;
pub mod schema;
pub mod training;
