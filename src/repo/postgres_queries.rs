pub const QUERY_GET_ORGANIZATION: &str = r#"
SELECT id, name, pix_key, pix_merchant_name, pix_merchant_city, created_at
FROM organizations
WHERE id = $1;
"#;

pub const QUERY_GET_MEMBERSHIP: &str = r#"
SELECT organization_id, user_id, role
FROM organization_members
WHERE organization_id = $1 AND user_id = $2;
"#;

pub const QUERY_GET_CLIENT: &str = r#"
SELECT id, organization_id, full_name, email, phone, monthly_fee, due_day, is_active, created_at
FROM clients
WHERE organization_id = $1 AND id = $2;
"#;

pub const QUERY_LIST_CLIENTS: &str = r#"
SELECT id, organization_id, full_name, email, phone, monthly_fee, due_day, is_active, created_at
FROM clients
WHERE organization_id = $1
ORDER BY full_name;
"#;

pub const QUERY_GET_INVOICE: &str = r#"
SELECT id, organization_id, client_id, reference_month, amount, due_date, status,
    paid_at, paid_amount, payment_method, pix_payload, created_at, updated_at
FROM invoices
WHERE organization_id = $1 AND id = $2;
"#;

pub const QUERY_LIST_INVOICES: &str = r#"
SELECT id, organization_id, client_id, reference_month, amount, due_date, status,
    paid_at, paid_amount, payment_method, pix_payload, created_at, updated_at
FROM invoices
WHERE organization_id = $1 AND due_date BETWEEN $2 AND $3
ORDER BY due_date, created_at;
"#;

pub const QUERY_SAVE_PIX_PAYLOAD: &str = r#"
UPDATE invoices SET pix_payload = $2, updated_at = now() WHERE id = $1;
"#;

pub const QUERY_REGISTER_MANUAL_PAYMENT: &str = r#"
UPDATE invoices
SET status = 'paid',
    paid_at = $3,
    paid_amount = $4,
    payment_method = $5,
    payment_notes = $6,
    updated_at = $7
WHERE organization_id = $1 AND id = $2 AND status IN ('pending', 'overdue')
RETURNING id, organization_id, client_id, reference_month, amount, due_date, status,
    paid_at, paid_amount, payment_method, pix_payload, created_at, updated_at;
"#;

pub const QUERY_CANCEL_INVOICE: &str = r#"
UPDATE invoices
SET status = 'cancelled', updated_at = now()
WHERE organization_id = $1 AND id = $2 AND status <> 'paid';
"#;

pub const QUERY_GENERATE_MONTHLY_INVOICES: &str =
    "SELECT generate_monthly_invoices($1, $2)::BIGINT AS created;";

pub const QUERY_MARK_OVERDUE_INVOICES: &str =
    "SELECT mark_overdue_invoices($1, $2)::BIGINT AS updated;";
