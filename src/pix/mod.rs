//! # PIX BR Code
//!
//! Builds and reads the text payload behind a PIX "copia e cola" code, the
//! Brazilian Central Bank profile of the EMV QR Code specification.
//!
//! The payload is a flat sequence of TLV fields (two digit id, two digit
//! length, value) with two nested groups (merchant account information and
//! additional data) and a trailing CRC-16/CCITT-FALSE checksum.
//!
//! ## Modules
//!
//! - [`crc`] - CRC-16/CCITT-FALSE checksum of the payload
//! - [`decode`] - Parsing and checksum verification of an existing payload
//! - [`payload`] - Payload assembly from a key and merchant metadata
//! - [`sanitize`] - Free text normalization to the BR Code character set
//! - [`tlv`] - Field encoding and parsing

pub mod crc;
pub mod decode;
pub mod payload;
pub mod sanitize;
pub mod tlv;

use derive_more::{Display, Error};

pub use crc::crc16;
pub use decode::{DecodedPix, PixDecodeError, decode_pix_payload};
pub use payload::{PixPayloadInput, build_pix_payload};
pub use sanitize::sanitize;

/// Field ids used by the PIX profile of the BR Code.
pub mod ids {
    pub const PAYLOAD_FORMAT_INDICATOR: &str = "00";
    pub const MERCHANT_ACCOUNT_INFO: &str = "26";
    pub const MERCHANT_CATEGORY_CODE: &str = "52";
    pub const TRANSACTION_CURRENCY: &str = "53";
    pub const TRANSACTION_AMOUNT: &str = "54";
    pub const COUNTRY_CODE: &str = "58";
    pub const MERCHANT_NAME: &str = "59";
    pub const MERCHANT_CITY: &str = "60";
    pub const ADDITIONAL_DATA: &str = "62";
    pub const CRC: &str = "63";

    // merchant account information (26) sub-fields
    pub const ACCOUNT_GUI: &str = "00";
    pub const ACCOUNT_KEY: &str = "01";
    pub const ACCOUNT_DESCRIPTION: &str = "02";

    // additional data (62) sub-fields
    pub const REFERENCE_LABEL: &str = "05";
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum PixError {
    /// The payment key is blank or can not fit in the merchant account group
    #[display("invalid pix key: {_0}")]
    InvalidKey(#[error(not(source))] String),
}
