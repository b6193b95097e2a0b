//! Financial reports of an organization over a period of due dates.

use std::collections::HashMap;

use anyhow::{Context, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{BillingError, load_organization, pdf_handler};
use crate::{
    consts,
    models::{
        self,
        invoice::{Invoice, InvoiceStatus},
    },
    repo, templates, utils,
};

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct StatusTotals {
    pub count: u64,
    pub amount: Decimal,
}

impl StatusTotals {
    fn add(&mut self, amount: Decimal) {
        self.count += 1;
        self.amount += amount;
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinancialSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Every invoice but the cancelled ones
    pub invoiced: StatusTotals,
    /// Paid invoices, by the amount actually received
    pub received: StatusTotals,
    /// Open and not yet due
    pub pending: StatusTotals,
    /// Open and past the due date
    pub overdue: StatusTotals,
    pub cancelled: StatusTotals,
}

/// A period is valid when ordered and no longer than a year
pub fn validate_period(from: NaiveDate, to: NaiveDate) -> Result<(), BillingError> {
    if from > to {
        return Err(BillingError::InvalidPeriod(format!("{from} is after {to}")));
    }

    if (to - from).num_days() > consts::MAX_REPORT_DAYS {
        return Err(BillingError::InvalidPeriod(format!(
            "longer than {} days",
            consts::MAX_REPORT_DAYS
        )));
    }

    Ok(())
}

/// Totals of `invoices` by their status as of `today`
pub fn summarize(
    from: NaiveDate,
    to: NaiveDate,
    invoices: &[Invoice],
    today: NaiveDate,
) -> FinancialSummary {
    let mut summary = FinancialSummary {
        from,
        to,
        invoiced: StatusTotals::default(),
        received: StatusTotals::default(),
        pending: StatusTotals::default(),
        overdue: StatusTotals::default(),
        cancelled: StatusTotals::default(),
    };

    for invoice in invoices {
        match invoice.status_on(today) {
            InvoiceStatus::Cancelled => {
                summary.cancelled.add(invoice.amount);
                continue;
            }
            InvoiceStatus::Paid => summary.received.add(invoice.received_amount()),
            InvoiceStatus::Pending => summary.pending.add(invoice.amount),
            InvoiceStatus::Overdue => summary.overdue.add(invoice.amount),
        }
        summary.invoiced.add(invoice.amount);
    }

    summary
}

/// Invoices of the period with the name of their clients
struct ReportData {
    organization: models::organization::Organization,
    invoices: Vec<Invoice>,
    client_names: HashMap<Uuid, String>,
}

impl ReportData {
    fn client_name(&self, client_id: &Uuid) -> &str {
        self.client_names
            .get(client_id)
            .map(String::as_str)
            .unwrap_or("-")
    }
}

async fn load_report_data(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<ReportData, BillingError> {
    validate_period(from, to)?;

    let organization = load_organization(repo, organization_id).await?;
    let invoices = repo.list_invoices(organization_id, from, to).await?;
    let client_names = repo
        .list_clients(organization_id)
        .await?
        .into_iter()
        .map(|client| (client.id, client.full_name))
        .collect();

    Ok(ReportData {
        organization,
        invoices,
        client_names,
    })
}

pub async fn financial_summary(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<FinancialSummary, BillingError> {
    validate_period(from, to)?;

    let invoices = repo.list_invoices(organization_id, from, to).await?;

    Ok(summarize(from, to, &invoices, today))
}

#[derive(Debug, Serialize)]
struct InvoiceCsvRow<'a> {
    invoice_id: Uuid,
    client: &'a str,
    reference_month: String,
    due_date: NaiveDate,
    amount: String,
    status: InvoiceStatus,
    paid_at: Option<String>,
    paid_amount: Option<String>,
    payment_method: Option<models::payment::PaymentMethod>,
    txid: String,
}

fn invoices_csv(data: &ReportData, today: NaiveDate) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(vec![]);

    for invoice in &data.invoices {
        writer
            .serialize(InvoiceCsvRow {
                invoice_id: invoice.id,
                client: data.client_name(&invoice.client_id),
                reference_month: utils::format_month_br(invoice.reference_month),
                due_date: invoice.due_date,
                amount: invoice.amount.to_string(),
                status: invoice.status_on(today),
                paid_at: invoice.paid_at.map(|paid_at| paid_at.to_rfc3339()),
                paid_amount: invoice.paid_amount.map(|amount| amount.to_string()),
                payment_method: invoice.payment_method,
                txid: invoice.txid(),
            })
            .context("failed to write invoice csv row")?;
    }

    writer
        .into_inner()
        .map_err(|error| anyhow!("failed to flush invoice csv: {}", error.error()))
}

/// CSV with one row per invoice due in the period
pub async fn export_csv(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<u8>, BillingError> {
    let data = load_report_data(repo, organization_id, from, to).await?;

    Ok(invoices_csv(&data, today)?)
}

#[derive(Serialize)]
struct TotalsRow {
    label: &'static str,
    count: u64,
    amount: String,
}

#[derive(Serialize)]
struct InvoicePdfRow<'a> {
    client: &'a str,
    due_date: String,
    amount: String,
    status: &'static str,
}

fn status_label(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::Pending => "Em aberto",
        InvoiceStatus::Paid => "Paga",
        InvoiceStatus::Overdue => "Vencida",
        InvoiceStatus::Cancelled => "Cancelada",
    }
}

fn summary_markup(
    data: &ReportData,
    summary: &FinancialSummary,
    today: NaiveDate,
) -> anyhow::Result<String> {
    let totals_row = |label, totals: &StatusTotals| TotalsRow {
        label,
        count: totals.count,
        amount: utils::format_brl(totals.amount),
    };
    let totals = vec![
        totals_row("Faturado", &summary.invoiced),
        totals_row("Recebido", &summary.received),
        totals_row("Em aberto", &summary.pending),
        totals_row("Vencido", &summary.overdue),
        totals_row("Cancelado", &summary.cancelled),
    ];

    let invoices = data
        .invoices
        .iter()
        .map(|invoice| InvoicePdfRow {
            client: data.client_name(&invoice.client_id),
            due_date: utils::format_date_br(invoice.due_date),
            amount: utils::format_brl(invoice.amount),
            status: status_label(invoice.status_on(today)),
        })
        .collect::<Vec<_>>();

    let mut context = tera::Context::new();
    context.insert("organization_name", &data.organization.name);
    context.insert("from", &utils::format_date_br(summary.from));
    context.insert("to", &utils::format_date_br(summary.to));
    context.insert("totals", &totals);
    context.insert("invoices", &invoices);

    Ok(templates::TEMPLATES.render(templates::REPORT_SUMMARY, &context)?)
}

/// PDF with the period totals followed by the invoice list
pub async fn export_pdf(
    repo: &repo::ImplAppRepo,
    organization_id: Uuid,
    from: NaiveDate,
    to: NaiveDate,
    today: NaiveDate,
) -> Result<Vec<u8>, BillingError> {
    let data = load_report_data(repo, organization_id, from, to).await?;
    let summary = summarize(from, to, &data.invoices, today);
    let markup = summary_markup(&data, &summary, today)?;

    Ok(pdf_handler::create_pdf_bytes_from_str(&markup)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            client::tests::create_test_client, invoice::tests::create_test_invoice,
            organization::tests::create_test_organization, payment::PaymentMethod,
        },
        repo::MockAppRepo,
    };
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_invoices() -> Vec<Invoice> {
        let mut paid = create_test_invoice(InvoiceStatus::Paid);
        paid.paid_amount = Some(dec!(160.00));
        paid.payment_method = Some(PaymentMethod::Cash);

        let pending = create_test_invoice(InvoiceStatus::Pending);

        let mut late = create_test_invoice(InvoiceStatus::Pending);
        late.due_date = date(2026, 10, 5);
        late.amount = dec!(99.90);

        let mut overdue = create_test_invoice(InvoiceStatus::Overdue);
        overdue.amount = dec!(80);

        let cancelled = create_test_invoice(InvoiceStatus::Cancelled);

        vec![paid, pending, late, overdue, cancelled]
    }

    fn mock_repo_with_report_data() -> repo::ImplAppRepo {
        let mut mock_repo = MockAppRepo::new();
        mock_repo
            .expect_get_organization()
            .returning(|_| Ok(Some(create_test_organization(Some("k")))));
        mock_repo
            .expect_list_invoices()
            .returning(|_, _, _| Ok(create_test_invoices()));
        mock_repo
            .expect_list_clients()
            .returning(|_| Ok(vec![create_test_client(None, None)]));
        Box::new(mock_repo)
    }

    #[test]
    fn test_validate_period() {
        assert!(validate_period(date(2026, 10, 1), date(2026, 10, 31)).is_ok());
        assert!(validate_period(date(2026, 10, 1), date(2026, 10, 1)).is_ok());
        assert!(validate_period(date(2026, 1, 1), date(2027, 1, 1)).is_ok());
        assert!(matches!(
            validate_period(date(2026, 10, 2), date(2026, 10, 1)),
            Err(BillingError::InvalidPeriod(_))
        ));
        assert!(matches!(
            validate_period(date(2025, 1, 1), date(2027, 1, 1)),
            Err(BillingError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_summarize() {
        let today = date(2026, 10, 8);
        let summary = summarize(
            date(2026, 10, 1),
            date(2026, 10, 31),
            &create_test_invoices(),
            today,
        );

        assert_eq!(
            summary.invoiced,
            StatusTotals {
                count: 4,
                amount: dec!(479.90)
            }
        );
        assert_eq!(
            summary.received,
            StatusTotals {
                count: 1,
                amount: dec!(160.00)
            }
        );
        assert_eq!(
            summary.pending,
            StatusTotals {
                count: 1,
                amount: dec!(150.00)
            }
        );
        // one flagged by the procedure, one pending past its due date
        assert_eq!(
            summary.overdue,
            StatusTotals {
                count: 2,
                amount: dec!(179.90)
            }
        );
        assert_eq!(
            summary.cancelled,
            StatusTotals {
                count: 1,
                amount: dec!(150.00)
            }
        );
    }

    #[test]
    fn test_summarize_nothing() {
        let summary = summarize(date(2026, 10, 1), date(2026, 10, 31), &[], date(2026, 10, 8));
        assert_eq!(summary.invoiced, StatusTotals::default());
        assert_eq!(summary.received.amount, Decimal::ZERO);
    }

    #[ntex::test]
    async fn test_financial_summary() {
        let mock_repo = mock_repo_with_report_data();

        let summary = financial_summary(
            &mock_repo,
            Uuid::new_v4(),
            date(2026, 10, 1),
            date(2026, 10, 31),
            date(2026, 10, 8),
        )
        .await
        .unwrap();

        assert_eq!(summary.invoiced.count, 4);
        assert_eq!(summary.from, date(2026, 10, 1));
    }

    #[ntex::test]
    async fn test_export_csv() {
        let mock_repo = mock_repo_with_report_data();

        let csv = export_csv(
            &mock_repo,
            Uuid::new_v4(),
            date(2026, 10, 1),
            date(2026, 10, 31),
            date(2026, 10, 8),
        )
        .await
        .unwrap();
        let csv = String::from_utf8(csv).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();

        assert_eq!(
            lines[0],
            "invoice_id,client,reference_month,due_date,amount,status,paid_at,paid_amount,payment_method,txid"
        );
        assert_eq!(lines.len(), 6);
        assert!(lines[1].ends_with(
            "Maria da Silva,10/2026,2026-10-10,150.00,paid,,160.00,cash,SHAD202610A1B2C3D4"
        ));
        assert!(lines[3].contains(",99.90,overdue,"));
    }

    #[ntex::test]
    async fn test_export_rejects_long_period() {
        let mut mock_repo = MockAppRepo::new();
        mock_repo.expect_list_invoices().times(0);
        let mock_repo: repo::ImplAppRepo = Box::new(mock_repo);

        let result = export_csv(
            &mock_repo,
            Uuid::new_v4(),
            date(2024, 1, 1),
            date(2026, 1, 1),
            date(2026, 10, 8),
        )
        .await;

        assert!(matches!(result, Err(BillingError::InvalidPeriod(_))));
    }

    #[test]
    fn test_summary_markup_escapes_names() {
        let mut organization = create_test_organization(Some("k"));
        organization.name = "Academia #1".into();
        let data = ReportData {
            organization,
            invoices: create_test_invoices(),
            client_names: HashMap::new(),
        };
        let summary = summarize(
            date(2026, 10, 1),
            date(2026, 10, 31),
            &data.invoices,
            date(2026, 10, 8),
        );

        let markup = summary_markup(&data, &summary, date(2026, 10, 8)).unwrap();

        assert!(markup.contains("*Academia \\#1*"));
        assert!(markup.contains("01\\/10\\/2026 a 31\\/10\\/2026"));
        assert!(markup.contains("[Recebido], [1], [R\\$ 160,00]"));
        assert!(markup.contains("[Vencida]"));
    }

    #[ntex::test]
    async fn test_export_pdf() {
        let mock_repo = mock_repo_with_report_data();

        let pdf = export_pdf(
            &mock_repo,
            Uuid::new_v4(),
            date(2026, 10, 1),
            date(2026, 10, 31),
            date(2026, 10, 8),
        )
        .await
        .unwrap();

        assert!(pdf.starts_with(b"%PDF"));
    }
}
