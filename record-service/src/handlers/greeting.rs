use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

pub const GREETING: &str = "Welcome to the record service";

#[derive(Debug, Serialize)]
pub struct GreetingResponse {
    pub message: &'static str,
    pub timestamp: String,
}

pub async fn greeting() -> Json<GreetingResponse> {
    Json(GreetingResponse {
        message: GREETING,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
