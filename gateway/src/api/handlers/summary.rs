//! `GET /v1/summary?q=<url>` — stub per SPEC_FULL §1's Non-goals: the
//! URL-metadata extractor (title/description scraping) this endpoint
//! would front is an external collaborator, not part of this crate.

use crate::api::dto::{SummaryQuery, SummaryResponse};
use actix_web::{web, HttpResponse};

pub async fn summarize(query: web::Query<SummaryQuery>) -> HttpResponse {
    HttpResponse::Ok().json(SummaryResponse {
        url: query.q.clone(),
        message: "summary extraction is not implemented by this gateway".to_string(),
    })
}
