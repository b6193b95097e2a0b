//! Reading back a PIX BR Code.
//!
//! Operators paste codes generated elsewhere (or by us) to check what a payer
//! will see. The checksum is verified before any field is trusted.

use std::str::FromStr;

use derive_more::{Display, Error};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{
    crc16, ids,
    payload::{CRC_FIELD_HEADER, CRC_HEX_LEN, PAYLOAD_FORMAT_VERSION, PIX_GUI},
    tlv,
};

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum PixDecodeError {
    #[display("payload is too short to carry a checksum")]
    TooShort,
    #[display("payload does not end with a crc field")]
    MissingChecksum,
    #[display("checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: String, found: String },
    #[display("malformed field at offset {_0}")]
    Malformed(#[error(not(source))] usize),
    #[display("missing field {_0}")]
    MissingField(#[error(not(source))] &'static str),
    #[display("unsupported payload format {_0}")]
    UnsupportedFormat(#[error(not(source))] String),
    #[display("merchant account is not a pix account: {_0}")]
    NotPix(#[error(not(source))] String),
    #[display("invalid amount {_0}")]
    InvalidAmount(#[error(not(source))] String),
}

/// The fields of a PIX payload a person cares about.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPix {
    pub key: String,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub merchant_name: String,
    pub merchant_city: String,
    pub txid: Option<String>,
}

fn required<'a>(fields: &[tlv::Field<'a>], id: &'static str) -> Result<&'a str, PixDecodeError> {
    tlv::find(fields, id).ok_or(PixDecodeError::MissingField(id))
}

fn verify_checksum(payload: &str) -> Result<(), PixDecodeError> {
    let split_at = payload
        .len()
        .checked_sub(CRC_HEX_LEN)
        .ok_or(PixDecodeError::TooShort)?;
    let (body, found) = payload
        .split_at_checked(split_at)
        .ok_or(PixDecodeError::MissingChecksum)?;

    if !body.ends_with(CRC_FIELD_HEADER) {
        return Err(PixDecodeError::MissingChecksum);
    }

    let expected = crc16(body);
    if !expected.eq_ignore_ascii_case(found) {
        return Err(PixDecodeError::ChecksumMismatch {
            expected,
            found: found.to_string(),
        });
    }

    Ok(())
}

/// Verifies and parses a BR Code into a [DecodedPix].
pub fn decode_pix_payload(payload: &str) -> Result<DecodedPix, PixDecodeError> {
    let payload = payload.trim();
    verify_checksum(payload)?;

    let fields = tlv::parse_fields(payload)?;

    let format = required(&fields, ids::PAYLOAD_FORMAT_INDICATOR)?;
    if format != PAYLOAD_FORMAT_VERSION {
        return Err(PixDecodeError::UnsupportedFormat(format.to_string()));
    }

    let account_fields = tlv::parse_fields(required(&fields, ids::MERCHANT_ACCOUNT_INFO)?)?;
    let gui = tlv::find(&account_fields, ids::ACCOUNT_GUI)
        .ok_or(PixDecodeError::MissingField("26.00"))?;
    if !gui.eq_ignore_ascii_case(PIX_GUI) {
        return Err(PixDecodeError::NotPix(gui.to_string()));
    }

    let key = tlv::find(&account_fields, ids::ACCOUNT_KEY)
        .ok_or(PixDecodeError::MissingField("26.01"))?;

    let amount = tlv::find(&fields, ids::TRANSACTION_AMOUNT)
        .map(|raw| {
            Decimal::from_str(raw).map_err(|_| PixDecodeError::InvalidAmount(raw.to_string()))
        })
        .transpose()?;

    let txid = match tlv::find(&fields, ids::ADDITIONAL_DATA) {
        Some(additional_data) => {
            let additional_fields = tlv::parse_fields(additional_data)?;
            tlv::find(&additional_fields, ids::REFERENCE_LABEL).map(String::from)
        }
        None => None,
    };

    Ok(DecodedPix {
        key: key.to_string(),
        description: tlv::find(&account_fields, ids::ACCOUNT_DESCRIPTION).map(String::from),
        amount,
        merchant_name: required(&fields, ids::MERCHANT_NAME)?.to_string(),
        merchant_city: required(&fields, ids::MERCHANT_CITY)?.to_string(),
        txid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pix::{PixPayloadInput, build_pix_payload};
    use rust_decimal_macros::dec;

    const CENTRAL_BANK_SAMPLE: &str = "00020126580014br.gov.bcb.pix0136123e4567-e12b-12d1-a456-426655440000\
                                       5204000053039865802BR5913Fulano de Tal6008BRASILIA62070503***63041D3D";

    #[test]
    fn test_decode_central_bank_sample() {
        let decoded = decode_pix_payload(CENTRAL_BANK_SAMPLE).unwrap();
        assert_eq!(
            decoded,
            DecodedPix {
                key: "123e4567-e12b-12d1-a456-426655440000".into(),
                description: None,
                amount: None,
                merchant_name: "Fulano de Tal".into(),
                merchant_city: "BRASILIA".into(),
                txid: Some("***".into()),
            }
        );
    }

    #[test]
    fn test_decode_accepts_lowercase_checksum() {
        let lowercase = CENTRAL_BANK_SAMPLE.replace("63041D3D", "63041d3d");
        assert!(decode_pix_payload(&lowercase).is_ok());
    }

    #[test]
    fn test_decode_reads_back_generated_payload() {
        let payload = build_pix_payload(&PixPayloadInput {
            key: "+5511999999999".into(),
            amount: Some("89,9".into()),
            merchant_name: Some("Academia Shad".into()),
            merchant_city: Some("Campinas".into()),
            txid: Some("SHAD202610A1B2C3D4".into()),
            description: Some("Mensalidade 10/2026".into()),
        })
        .unwrap();

        let decoded = decode_pix_payload(&payload).unwrap();
        assert_eq!(decoded.key, "+5511999999999");
        assert_eq!(decoded.amount, Some(dec!(89.90)));
        assert_eq!(decoded.merchant_name, "Academia Shad");
        assert_eq!(decoded.merchant_city, "Campinas");
        assert_eq!(decoded.txid.as_deref(), Some("SHAD202610A1B2C3D4"));
        assert_eq!(decoded.description.as_deref(), Some("Mensalidade 10/2026"));
    }

    #[test]
    fn test_decode_reads_back_non_ascii_key() {
        let payload = build_pix_payload(&PixPayloadInput {
            amount: Some("150".into()),
            ..PixPayloadInput::new("joão@exemplo.com")
        })
        .unwrap();

        let decoded = decode_pix_payload(&payload).unwrap();
        assert_eq!(decoded.key, "joão@exemplo.com");
        assert_eq!(decoded.amount, Some(dec!(150.00)));
    }

    #[test]
    fn test_decode_rejects_multibyte_checksum() {
        assert_eq!(
            decode_pix_payload("000201630é001"),
            Err(PixDecodeError::MissingChecksum)
        );
    }

    #[test]
    fn test_decode_rejects_tampered_payload() {
        let tampered = CENTRAL_BANK_SAMPLE.replace("Fulano", "Ciclano");
        assert!(matches!(
            decode_pix_payload(&tampered),
            Err(PixDecodeError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_short_or_unterminated_input() {
        assert_eq!(decode_pix_payload("abc"), Err(PixDecodeError::TooShort));
        assert_eq!(
            decode_pix_payload("000201ABCD"),
            Err(PixDecodeError::MissingChecksum)
        );
    }

    #[test]
    fn test_decode_rejects_non_pix_account() {
        let body = format!(
            "{}{}{}{}{}{}",
            tlv::field("00", "01"),
            tlv::field("26", &format!("{}{}", tlv::field("00", "COM.EXAMPLE"), tlv::field("01", "k"))),
            tlv::field("58", "BR"),
            tlv::field("59", "Loja"),
            tlv::field("60", "Recife"),
            CRC_FIELD_HEADER,
        );
        let payload = format!("{body}{}", crc16(&body));

        assert_eq!(
            decode_pix_payload(&payload),
            Err(PixDecodeError::NotPix("COM.EXAMPLE".into()))
        );
    }
}
