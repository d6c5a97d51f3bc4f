//! Liveness probe.

use actix_web::{get, HttpResponse};

/// Report process liveness.
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
