use chrono::{Months, NaiveDate, Utc};
use ntex::web;
use serde::Deserialize;

use crate::utils;

/// `?from=YYYY-MM-DD&to=YYYY-MM-DD`, the current month when missing
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl PeriodQuery {
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let month_start = utils::first_day_of_month(today);
        let month_end = month_start
            .checked_add_months(Months::new(1))
            .and_then(|next_month| next_month.pred_opt())
            .unwrap_or(today);

        (
            self.from.unwrap_or(month_start),
            self.to.unwrap_or(month_end),
        )
    }
}

/// Today in the billing timezone
pub fn billing_today() -> NaiveDate {
    utils::billing_today(Utc::now())
}

/// [ntex responder](ntex::web::HttpResponse) downloading `body` as `filename`
pub fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> web::HttpResponse {
    web::HttpResponse::Ok()
        .content_type(content_type)
        .header(
            "content-disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .body(body)
}
