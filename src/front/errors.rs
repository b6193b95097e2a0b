use derive_more::{Display, Error};
use log::error;
use ntex::{http, web};
use serde_json::json;

use crate::api::BillingError;

#[derive(Debug, Display, Error)]
pub enum UserError {
    #[display("resource not found")]
    UrlNotFound,
    #[display("missing or invalid x-user-id header")]
    Unauthorized,
    #[display("{_0}")]
    Forbidden(#[error(not(source))] String),
    #[display("{_0}")]
    NotFound(#[error(not(source))] String),
    #[display("{_0}")]
    Conflict(#[error(not(source))] String),
    #[display("{_0}")]
    InvalidInput(#[error(not(source))] String),
}

fn json_error_response(status: http::StatusCode, message: &str) -> web::HttpResponse {
    web::HttpResponse::build(status).json(&json!({ "error": message }))
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        json_error_response(self.status_code(), &self.to_string())
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound | UserError::NotFound(_) => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            UserError::Forbidden(_) => http::StatusCode::FORBIDDEN,
            UserError::Conflict(_) => http::StatusCode::CONFLICT,
            UserError::InvalidInput(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    QrCodeError(#[error(not(source))] String),
    InternalServerError(#[error(not(source))] String),
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::QrCodeError(msg) => format!("[QrCodeError] {:#?}", msg),
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        // details stay in the logs
        json_error_response(self.status_code(), "internal server error")
    }

    fn status_code(&self) -> http::StatusCode {
        http::StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn classify(error: BillingError) -> Result<UserError, ServerError> {
    let message = error.to_string();

    match error {
        BillingError::OrganizationNotFound
        | BillingError::InvoiceNotFound
        | BillingError::ClientNotFound => Ok(UserError::NotFound(message)),
        BillingError::NotAMember | BillingError::Forbidden => Ok(UserError::Forbidden(message)),
        BillingError::InvoiceNotOpen(_) => Ok(UserError::Conflict(message)),
        BillingError::InvalidPaymentAmount
        | BillingError::PartialPayment(_)
        | BillingError::NoContact(_)
        | BillingError::InvalidPeriod(_)
        | BillingError::Pix(_) => Ok(UserError::InvalidInput(message)),
        BillingError::Internal(e) => Err(ServerError::InternalServerError(format!("{e:#}"))),
    }
}

/// Maps a failed billing operation to the error returned to the caller
pub fn from_billing(error: BillingError) -> web::Error {
    match classify(error) {
        Ok(user_error) => user_error.into(),
        Err(server_error) => server_error.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::invoice::InvoiceStatus, pix::PixError};
    use ntex::web::error::WebResponseError;
    use rust_decimal_macros::dec;

    fn status_of(error: BillingError) -> http::StatusCode {
        match classify(error) {
            Ok(user_error) => user_error.status_code(),
            Err(server_error) => server_error.status_code(),
        }
    }

    #[test]
    fn test_billing_error_status() {
        assert_eq!(
            status_of(BillingError::InvoiceNotFound),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(BillingError::Forbidden),
            http::StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(BillingError::InvoiceNotOpen(InvoiceStatus::Paid)),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(BillingError::PartialPayment(dec!(150))),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BillingError::Pix(PixError::InvalidKey("blank".into()))),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(BillingError::Internal(anyhow::anyhow!("db down"))),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_error_messages() {
        assert_eq!(
            UserError::Unauthorized.to_string(),
            "missing or invalid x-user-id header"
        );
        assert_eq!(
            UserError::Conflict(BillingError::InvoiceNotOpen(InvoiceStatus::Paid).to_string())
                .to_string(),
            "invoice is paid"
        );
    }
}
