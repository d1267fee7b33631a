//! `GET /health` — liveness probe. Grounded in
//! `auth-service/src/api/handlers.rs::health_check`.

use crate::api::dto::HealthResponse;
use actix_web::HttpResponse;
use chrono::Utc;

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "gateway".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
