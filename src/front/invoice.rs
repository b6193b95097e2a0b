//! Invoice endpoints of an organization, under `/org/{org_id}`.

use chrono::NaiveDate;
use ntex::web;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{
    api::{self, collection::CollectionChannel, membership},
    consts,
    front::{AppState, errors, middleware::gateway_user::GatewayUser, utils},
    metric, models, qr,
};

#[web::get("/invoices")]
async fn list_invoices(
    user: GatewayUser,
    path: web::types::Path<(Uuid,)>,
    query: web::types::Query<utils::PeriodQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let organization_id = path.0;
    membership::require_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let (from, to) = query.resolve(utils::billing_today());
    let invoices = api::invoice::list_invoices(&app_state.repo, organization_id, from, to)
        .await
        .map_err(errors::from_billing)?;

    Ok(web::HttpResponse::Ok().json(&invoices))
}

#[web::get("/invoices/{invoice_id}/pix")]
async fn get_invoice_pix(
    user: GatewayUser,
    path: web::types::Path<(Uuid, Uuid)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let (organization_id, invoice_id) = path.into_inner();
    membership::require_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let charge = api::pix::pix_charge_for_invoice(&app_state.repo, organization_id, invoice_id)
        .await
        .map_err(errors::from_billing)?;
    metric::incr_pix_payload_statds("invoice");

    Ok(web::HttpResponse::Ok().json(&charge))
}

#[web::get("/invoices/{invoice_id}/pix/qr.png")]
async fn get_invoice_pix_qr_code(
    user: GatewayUser,
    path: web::types::Path<(Uuid, Uuid)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let (organization_id, invoice_id) = path.into_inner();
    membership::require_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let invoice_pix = api::pix::invoice_pix(&app_state.repo, organization_id, invoice_id)
        .await
        .map_err(errors::from_billing)?;
    let qr_code = qr::render_pix_qr_png(&invoice_pix.payload).map_err(|e| {
        errors::ServerError::QrCodeError(format!("invoice qr_code could not be generated: {e}"))
    })?;

    Ok(web::HttpResponse::Ok()
        .content_type(consts::PNG_CONTENT_TYPE)
        .body(qr_code))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInvoicesRequest {
    /// Any day of the month to invoice, the current month when missing
    #[serde(default)]
    pub reference_month: Option<NaiveDate>,
}

#[web::post("/invoices/generate")]
async fn generate_invoices(
    user: GatewayUser,
    path: web::types::Path<(Uuid,)>,
    body: web::types::Json<GenerateInvoicesRequest>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let organization_id = path.0;
    membership::require_billing_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let created = api::invoice::generate_monthly_invoices(
        &app_state.repo,
        organization_id,
        body.reference_month,
        utils::billing_today(),
    )
    .await
    .map_err(errors::from_billing)?;
    metric::incr_invoice_job_statds("generate");

    Ok(web::HttpResponse::Ok().json(&json!({ "created": created })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManualPaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub method: models::payment::PaymentMethod,
    /// Defaults to today
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ManualPaymentRequest {
    fn into_payment(self, invoice_id: Uuid, today: NaiveDate) -> models::payment::ManualPayment {
        models::payment::ManualPayment {
            invoice_id,
            amount: self.amount,
            method: self.method,
            paid_on: self.paid_on.unwrap_or(today),
            notes: self.notes.filter(|notes| !notes.trim().is_empty()),
        }
    }
}

#[web::post("/invoices/{invoice_id}/payments")]
async fn register_payment(
    user: GatewayUser,
    path: web::types::Path<(Uuid, Uuid)>,
    body: web::types::Json<ManualPaymentRequest>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let (organization_id, invoice_id) = path.into_inner();
    membership::require_billing_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let payment = body
        .into_inner()
        .into_payment(invoice_id, utils::billing_today());
    let invoice = api::invoice::register_manual_payment(&app_state.repo, organization_id, &payment)
        .await
        .map_err(errors::from_billing)?;
    metric::incr_payment_statds(&payment.method.to_string());

    Ok(web::HttpResponse::Ok().json(&invoice))
}

#[web::post("/invoices/{invoice_id}/cancel")]
async fn cancel_invoice(
    user: GatewayUser,
    path: web::types::Path<(Uuid, Uuid)>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let (organization_id, invoice_id) = path.into_inner();
    membership::require_billing_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    api::invoice::cancel_invoice(&app_state.repo, organization_id, invoice_id)
        .await
        .map_err(errors::from_billing)?;

    Ok(web::HttpResponse::NoContent().finish())
}

#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    pub channel: CollectionChannel,
}

#[web::post("/invoices/{invoice_id}/collect")]
async fn collect_invoice(
    user: GatewayUser,
    path: web::types::Path<(Uuid, Uuid)>,
    body: web::types::Json<CollectRequest>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let (organization_id, invoice_id) = path.into_inner();
    membership::require_billing_member(
        &app_state.membership_cache,
        &app_state.repo,
        organization_id,
        user.id,
    )
    .await
    .map_err(errors::from_billing)?;

    let receipt = api::collection::send_collection(
        &app_state.repo,
        &app_state.notification_service,
        organization_id,
        invoice_id,
        body.channel,
        utils::billing_today(),
    )
    .await
    .map_err(errors::from_billing)?;
    metric::incr_collection_statds(&receipt.channel.to_string());

    Ok(web::HttpResponse::Ok().json(&receipt))
}
