//! Frontend route configuration module.
//!
//! Routes are grouped by functionality into scopes.

use super::{internal_api, invoice, pix, report};
use ntex::web;

/// Configures the public PIX tools.
///
/// # Routes
/// - `POST /pix/payload` - Build a BR Code payload
/// - `GET /pix/qr` - Render a BR Code payload as a PNG QR code
/// - `POST /pix/decode` - Read back a "copia e cola" code
pub fn pix_tools(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/pix").service((
        pix::create_pix_payload,
        pix::get_pix_qr_code,
        pix::decode_pix_payload,
    )));
}

/// Configures the billing routes of an organization.
///
/// Every route requires the `x-user-id` header of a member; writes
/// require the owner or admin role.
///
/// # Invoice Routes
/// - `GET /org/{org_id}/invoices` - Invoices due in a period
/// - `GET /org/{org_id}/invoices/{invoice_id}/pix` - PIX charge of an open invoice
/// - `GET /org/{org_id}/invoices/{invoice_id}/pix/qr.png` - Its QR code
/// - `POST /org/{org_id}/invoices/generate` - Monthly invoice generation
/// - `POST /org/{org_id}/invoices/{invoice_id}/payments` - Manual payment
/// - `POST /org/{org_id}/invoices/{invoice_id}/cancel` - Cancel an invoice
/// - `POST /org/{org_id}/invoices/{invoice_id}/collect` - Send a collection message
///
/// # Report Routes
/// - `GET /org/{org_id}/reports/summary` - Period totals
/// - `GET /org/{org_id}/reports/export.csv` - Invoice CSV
/// - `GET /org/{org_id}/reports/export.pdf` - PDF report
pub fn organization(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/org/{org_id}").service((
        invoice::list_invoices,
        invoice::get_invoice_pix,
        invoice::get_invoice_pix_qr_code,
        invoice::generate_invoices,
        invoice::register_payment,
        invoice::cancel_invoice,
        invoice::collect_invoice,
        report::get_financial_summary,
        report::export_csv,
        report::export_pdf,
    )));
}

/// Configures the scheduler endpoints.
///
/// # Routes
/// - `POST /internal/invoices/mark-overdue` - Daily overdue sweep
pub fn internal(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/internal").service((internal_api::mark_overdue_invoices,)));
}
