//! Handlers not linked to a specific url

use ntex::web;
use serde_json::json;

use crate::front::errors;

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Liveness check for the load balancer
#[web::get("/health")]
async fn health() -> Result<impl web::Responder, web::Error> {
    Ok(web::HttpResponse::Ok().json(&json!({ "status": "ok" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::test;

    #[ntex::test]
    async fn test_health_and_not_found() {
        let app = test::init_service(
            web::App::new()
                .service(health)
                .default_service(web::route().to(serve_not_found)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert!(resp.status().is_success());

        let resp = test::call_service(&app, test::TestRequest::get().uri("/nope").to_request()).await;
        assert_eq!(resp.status(), ntex::http::StatusCode::NOT_FOUND);
    }
}
