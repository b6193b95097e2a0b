//! # QR Code Generation Module
//!
//! Renders PIX payloads as scannable QR images for the invoice page, the
//! collection email and the public PIX tool.

use base64::{Engine, engine::general_purpose::STANDARD};
use fast_qr::{
    ECL,
    convert::{Builder, Shape, image::ImageBuilder},
    qr::QRBuilder,
};

const QR_WIDTH_PX: u32 = 600;

/// Generates a PNG QR code for a PIX "copia e cola" payload.
///
/// Uses medium error correction, the level banking apps expect for BR Codes
/// of this size, with black square modules on a white background.
///
/// # Errors
/// Returns an error if the payload does not fit in a QR code or the image
/// can not be encoded.
pub fn render_pix_qr_png(payload: &str) -> anyhow::Result<Vec<u8>> {
    let qr_code = QRBuilder::new(payload.as_bytes().to_vec())
        .ecl(ECL::M)
        .build()?;

    Ok(ImageBuilder::default()
        .shape(Shape::Square)
        .background_color("#ffffff")
        .module_color("#000000")
        .fit_width(QR_WIDTH_PX)
        .to_bytes(&qr_code)?)
}

/// `data:` uri of a PNG, embeddable in html emails and json responses
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}
