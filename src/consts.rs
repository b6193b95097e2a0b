use chrono_tz::Tz;

/// Due dates and "today" are evaluated in Brasilia time
pub const BILLING_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

pub const INTERNAL_SECRET_HEADER: &str = "X-Internal-Secret";
/// Set by the authenticating gateway in front of the app
pub const USER_ID_HEADER: &str = "x-user-id";

pub const WHATSAPP_SHARE_URL: &str = "https://wa.me/";
pub const RESEND_EMAILS_ENDPOINT: &str = "https://api.resend.com/emails";
pub const BRAZIL_COUNTRY_CALLING_CODE: &str = "55";

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const PNG_CONTENT_TYPE: &str = "image/png";

/// Longest period a single report may cover
pub const MAX_REPORT_DAYS: i64 = 366;
