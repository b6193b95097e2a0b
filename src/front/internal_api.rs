//! Internal API endpoints for the scheduler.
//!
//! These endpoints are not exposed to the public internet and are only
//! called by the daily billing job. They require authentication via
//! the X-Internal-Secret header.

use ntex::web;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    api, consts,
    front::{AppState, errors, utils},
    metric,
};

/// Compares the secret in constant time, an empty expected secret disables the endpoints
fn is_valid_internal_secret(provided: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()))
}

/// Verifies the internal API secret from the request headers.
fn verify_internal_secret(req: &web::HttpRequest, expected: &str) -> bool {
    let secret = req
        .headers()
        .get(consts::INTERNAL_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    is_valid_internal_secret(secret, expected)
}

#[derive(Debug, Default, Deserialize)]
pub struct MarkOverdueQuery {
    /// Limits the sweep to one organization
    pub organization_id: Option<Uuid>,
}

/// Flags invoices due before today (Brasilia) as overdue.
#[web::post("/invoices/mark-overdue")]
pub async fn mark_overdue_invoices(
    req: web::HttpRequest,
    query: web::types::Query<MarkOverdueQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    if !verify_internal_secret(&req, &app_state.internal_api_secret) {
        return Ok(web::HttpResponse::Unauthorized().finish());
    }

    let marked = api::invoice::mark_overdue_invoices(
        &app_state.repo,
        query.organization_id,
        utils::billing_today(),
    )
    .await
    .map_err(errors::from_billing)?;
    metric::incr_invoice_job_statds("mark_overdue");

    Ok(web::HttpResponse::Ok().json(&serde_json::json!({ "marked": marked })))
}
