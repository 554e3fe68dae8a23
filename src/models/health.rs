use chrono::{DateTime, Utc};
use rocket::serde::Serialize;
use schemars::JsonSchema;
use std::time::Instant;

#[derive(Serialize, Debug, JsonSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the server started
    pub uptime: f64,
    pub timestamp: DateTime<Utc>,
}

/// Moment the server was built, managed as Rocket state.
#[derive(Debug, Clone, Copy)]
pub struct StartedAt(pub Instant);

impl Default for StartedAt {
    fn default() -> Self {
        Self(Instant::now())
    }
}

impl StartedAt {
    pub fn uptime_seconds(&self) -> f64 {
        self.0.elapsed().as_secs_f64()
    }
}
