pub mod handlers;
pub mod render;
pub mod routes;

pub use routes::*;

use crate::{config::Config, inference::InferencePipeline};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<InferencePipeline>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(pipeline: Arc<InferencePipeline>, config: Arc<Config>) -> Self {
        Self { pipeline, config }
    }
}
