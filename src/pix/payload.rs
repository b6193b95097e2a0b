//! # PIX payload assembly
//!
//! Turns a payment key plus optional merchant metadata into a complete,
//! checksummed BR Code. The function is pure: the same input always yields
//! the same payload.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::{
    PixError, crc16, ids,
    sanitize::{sanitize, sanitize_alphanumeric},
    tlv,
};

pub const PAYLOAD_FORMAT_VERSION: &str = "01";
pub const PIX_GUI: &str = "BR.GOV.BCB.PIX";
pub const MERCHANT_CATEGORY_CODE: &str = "0000";
/// ISO 4217 numeric code for BRL
pub const CURRENCY_BRL: &str = "986";
pub const COUNTRY_CODE: &str = "BR";

pub const DEFAULT_MERCHANT_NAME: &str = "Shad Manager";
pub const DEFAULT_MERCHANT_CITY: &str = "Sao Paulo";
pub const DEFAULT_TXID: &str = "SHADMENSAL";

pub const MERCHANT_NAME_MAX_LEN: usize = 25;
pub const MERCHANT_CITY_MAX_LEN: usize = 15;
pub const TXID_MAX_LEN: usize = 25;
pub const DESCRIPTION_MAX_LEN: usize = 40;

/// Id and length of the CRC field, part of the checksummed data
pub const CRC_FIELD_HEADER: &str = "6304";
pub const CRC_HEX_LEN: usize = 4;

/// Everything needed to build a PIX payload. Only `key` is required.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PixPayloadInput {
    pub key: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub merchant_city: Option<String>,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PixPayloadInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }
}

/// Parses an amount typed by a person: `150`, `150.00`, `150,00`, `1.234,56`
/// or `1,234.56`.
///
/// The last of `.` and `,` is the decimal separator and the other one groups
/// thousands. Returns `None` for anything that is not a number strictly
/// greater than zero once rounded to cents, including inputs with a repeated
/// decimal separator or characters other than digits, separators, a sign and
/// an exponent.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if !raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '+' | '-' | 'e' | 'E'))
    {
        return None;
    }

    let normalized = normalize_separators(raw)?;

    Decimal::from_str(&normalized)
        .or_else(|_| Decimal::from_scientific(&normalized))
        .ok()
        .map(|amount| amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .filter(|amount| *amount > Decimal::ZERO)
}

/// Rewrites `raw` with `.` as the only decimal separator and no grouping
fn normalize_separators(raw: &str) -> Option<String> {
    let (decimal_separator, group_separator) = match (raw.rfind('.'), raw.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => (',', '.'),
        (None, Some(_)) => (',', '.'),
        _ => ('.', ','),
    };

    if raw.matches(decimal_separator).count() > 1 {
        return None;
    }

    Some(raw.replace(group_separator, "").replace(decimal_separator, "."))
}

/// Amount with two decimals and a `.` separator, independent of locale.
pub fn format_amount(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

fn sanitized_or_default(value: Option<&str>, default: &str, max_length: usize) -> String {
    let raw = value.filter(|v| !v.trim().is_empty()).unwrap_or(default);
    let sanitized = sanitize(raw, max_length);

    if sanitized.is_empty() {
        return sanitize(default, max_length);
    }

    sanitized
}

fn reference_label(txid: Option<&str>) -> String {
    let label = sanitize_alphanumeric(txid.unwrap_or_default(), TXID_MAX_LEN);
    if label.is_empty() {
        return DEFAULT_TXID.to_string();
    }

    label
}

/// Nested `26` group: GUI, key and, when there is room, the description.
fn merchant_account_info(key: &str, description: Option<&str>) -> Result<String, PixError> {
    let mut group = tlv::field(ids::ACCOUNT_GUI, PIX_GUI);
    group.push_str(&tlv::field(ids::ACCOUNT_KEY, key));

    if group.len() > tlv::MAX_VALUE_LEN {
        return Err(PixError::InvalidKey(format!(
            "key with {} bytes does not fit in the payload",
            key.len()
        )));
    }

    let room = (tlv::MAX_VALUE_LEN - group.len())
        .saturating_sub(tlv::HEADER_LEN)
        .min(DESCRIPTION_MAX_LEN);
    let description = sanitize(description.unwrap_or_default(), room);

    if let Some(description_field) = tlv::optional_field(ids::ACCOUNT_DESCRIPTION, &description)
    {
        group.push_str(&description_field);
    }

    Ok(group)
}

/// Builds the BR Code for `input`.
///
/// # Errors
/// Fails with [PixError::InvalidKey] when the key is blank after trimming or
/// too long to be encoded. Every other field degrades to a default or is
/// omitted.
///
/// # Example
/// ```ignore
/// use crate::pix::{PixPayloadInput, build_pix_payload};
///
/// let payload = build_pix_payload(&PixPayloadInput {
///     amount: Some("150".into()),
///     ..PixPayloadInput::new("+5511999999999")
/// })
/// .unwrap();
/// assert!(payload.contains("5406150.00"));
/// ```
pub fn build_pix_payload(input: &PixPayloadInput) -> Result<String, PixError> {
    let key = input.key.trim();
    if key.is_empty() {
        return Err(PixError::InvalidKey("key is blank".into()));
    }

    let account_info = merchant_account_info(key, input.description.as_deref())?;
    let merchant_name = sanitized_or_default(
        input.merchant_name.as_deref(),
        DEFAULT_MERCHANT_NAME,
        MERCHANT_NAME_MAX_LEN,
    );
    let merchant_city = sanitized_or_default(
        input.merchant_city.as_deref(),
        DEFAULT_MERCHANT_CITY,
        MERCHANT_CITY_MAX_LEN,
    );
    let additional_data = tlv::field(
        ids::REFERENCE_LABEL,
        &reference_label(input.txid.as_deref()),
    );

    let mut payload = String::with_capacity(256);
    payload.push_str(&tlv::field(
        ids::PAYLOAD_FORMAT_INDICATOR,
        PAYLOAD_FORMAT_VERSION,
    ));
    payload.push_str(&tlv::field(ids::MERCHANT_ACCOUNT_INFO, &account_info));
    payload.push_str(&tlv::field(
        ids::MERCHANT_CATEGORY_CODE,
        MERCHANT_CATEGORY_CODE,
    ));
    payload.push_str(&tlv::field(ids::TRANSACTION_CURRENCY, CURRENCY_BRL));

    if let Some(amount) = input.amount.as_deref().and_then(parse_amount) {
        payload.push_str(&tlv::field(
            ids::TRANSACTION_AMOUNT,
            &format_amount(amount),
        ));
    }

    payload.push_str(&tlv::field(ids::COUNTRY_CODE, COUNTRY_CODE));
    payload.push_str(&tlv::field(ids::MERCHANT_NAME, &merchant_name));
    payload.push_str(&tlv::field(ids::MERCHANT_CITY, &merchant_city));
    payload.push_str(&tlv::field(ids::ADDITIONAL_DATA, &additional_data));

    payload.push_str(CRC_FIELD_HEADER);
    let checksum = crc16(&payload);
    payload.push_str(&checksum);

    Ok(payload)
}
