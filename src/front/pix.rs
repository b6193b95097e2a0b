//! Public PIX tools: build, render and read BR Code payloads without an
//! organization.

use ntex::web;
use serde::{Deserialize, Serialize};

use crate::{
    consts,
    front::errors,
    metric,
    pix::{self, PixPayloadInput},
    qr,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct PixPayloadBody {
    pub payload: String,
}

fn build_payload(input: &PixPayloadInput) -> Result<String, web::Error> {
    let payload = pix::build_pix_payload(input)
        .map_err(|e| errors::UserError::InvalidInput(e.to_string()))?;
    metric::incr_pix_payload_statds("tool");

    Ok(payload)
}

#[web::post("/payload")]
async fn create_pix_payload(
    input: web::types::Json<PixPayloadInput>,
) -> Result<impl web::Responder, web::Error> {
    let payload = build_payload(&input)?;

    Ok(web::HttpResponse::Ok().json(&PixPayloadBody { payload }))
}

#[web::get("/qr")]
async fn get_pix_qr_code(
    input: web::types::Query<PixPayloadInput>,
) -> Result<impl web::Responder, web::Error> {
    let payload = build_payload(&input)?;
    let qr_code = qr::render_pix_qr_png(&payload).map_err(|e| {
        errors::ServerError::QrCodeError(format!("pix qr_code could not be generated: {e}"))
    })?;

    Ok(web::HttpResponse::Ok()
        .content_type(consts::PNG_CONTENT_TYPE)
        .body(qr_code))
}

/// Reads back a pasted "copia e cola" code, rejecting bad checksums
#[web::post("/decode")]
async fn decode_pix_payload(
    body: web::types::Json<PixPayloadBody>,
) -> Result<impl web::Responder, web::Error> {
    let decoded = pix::decode_pix_payload(body.payload.trim())
        .map_err(|e| errors::UserError::InvalidInput(e.to_string()))?;

    Ok(web::HttpResponse::Ok().json(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ntex::web::test;
    use serde_json::json;

    #[ntex::test]
    async fn test_create_pix_payload() {
        let app = test::init_service(
            web::App::new().service(web::scope("/pix").service(create_pix_payload)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/pix/payload")
            .set_json(&json!({"key": "k", "amount": "150"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: PixPayloadBody = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert!(body.payload.contains("5406150.00"));
        assert!(body.payload.ends_with("63041682"));
    }

    #[ntex::test]
    async fn test_blank_key_is_bad_request() {
        let app = test::init_service(
            web::App::new().service(web::scope("/pix").service(create_pix_payload)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/pix/payload")
            .set_json(&json!({"key": "   "}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), ntex::http::StatusCode::BAD_REQUEST);
    }

    #[ntex::test]
    async fn test_decode_pix_payload() {
        let app = test::init_service(
            web::App::new().service(web::scope("/pix").service(decode_pix_payload)),
        )
        .await;

        let payload = pix::build_pix_payload(&PixPayloadInput::new("fulano@example.com")).unwrap();
        let req = test::TestRequest::post()
            .uri("/pix/decode")
            .set_json(&PixPayloadBody { payload })
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let decoded: serde_json::Value = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(decoded["key"], "fulano@example.com");
        assert_eq!(decoded["merchantName"], "Shad Manager");

        let req = test::TestRequest::post()
            .uri("/pix/decode")
            .set_json(&json!({"payload": "0002016304FFFF"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), ntex::http::StatusCode::BAD_REQUEST);
    }
}
