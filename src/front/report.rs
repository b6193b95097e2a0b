use ntex::web;
use uuid::Uuid;

use crate::{
    api::{self, membership},
    consts,
    front::{AppState, errors, middleware::gateway_user::GatewayUser, utils},
};

#[web::get("/reports/summary")]
async fn get_financial_summary(
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

    let today = utils::billing_today();
    let (from, to) = query.resolve(today);
    let summary =
        api::report::financial_summary(&app_state.repo, organization_id, from, to, today)
            .await
            .map_err(errors::from_billing)?;

    Ok(web::HttpResponse::Ok().json(&summary))
}

#[web::get("/reports/export.csv")]
async fn export_csv(
    user: GatewayUser,
    path: web::types::Path<(Uuid,)>,
    query: web::types::Query<utils::PeriodQuery>,
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

    let today = utils::billing_today();
    let (from, to) = query.resolve(today);
    let csv = api::report::export_csv(&app_state.repo, organization_id, from, to, today)
        .await
        .map_err(errors::from_billing)?;

    Ok(utils::attachment(
        consts::CSV_CONTENT_TYPE,
        &format!("faturas_{from}_{to}.csv"),
        csv,
    ))
}

#[web::get("/reports/export.pdf")]
async fn export_pdf(
    user: GatewayUser,
    path: web::types::Path<(Uuid,)>,
    query: web::types::Query<utils::PeriodQuery>,
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

    let today = utils::billing_today();
    let (from, to) = query.resolve(today);
    let pdf = api::report::export_pdf(&app_state.repo, organization_id, from, to, today)
        .await
        .map_err(errors::from_billing)?;

    Ok(utils::attachment(
        consts::PDF_CONTENT_TYPE,
        &format!("relatorio_{from}_{to}.pdf"),
        pdf,
    ))
}
