use actix_web::{get, web, HttpResponse, Responder};
use humantime::format_duration;
use serde::Serialize;
use std::time::Duration;

use crate::{constants::START_TIME, AppState};

#[derive(Serialize)]
struct HealthCheckResponse {
    status: &'static str,
    uptime: String,
    started_at: String,
    version: &'static str,
    recorder_enabled: bool,
}

#[get("/health")]
pub async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let uptime = chrono::Utc::now().signed_duration_since(*START_TIME);
    let uptime = Duration::from_secs(uptime.num_seconds().max(0) as u64);

    HttpResponse::Ok().json(HealthCheckResponse {
        status: "healthy",
        uptime: format_duration(uptime).to_string(),
        started_at: START_TIME.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        recorder_enabled: state.contact_handler.recorder_enabled(),
    })
}
