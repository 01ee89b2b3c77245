pub mod audit_handlers;
pub mod auth_handlers;
pub mod dashboard;
pub mod department_handlers;
pub mod faculty_handlers;
pub mod program_handlers;
pub mod proposal_handlers;
pub mod user_handlers;

use actix_web::HttpResponse;
use serde::Serialize;

/// Every successful response wraps its payload as `{ "data": ... }`.
pub fn data<T: Serialize>(value: T) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "data": value }))
}
