//! Tag-length-value fields of the BR Code.
//!
//! Every field is a 2 digit id, a 2 digit zero padded length and the value.

use super::decode::PixDecodeError;

pub const ID_LEN: usize = 2;
pub const LENGTH_LEN: usize = 2;
pub const HEADER_LEN: usize = ID_LEN + LENGTH_LEN;
/// Largest value a 2 digit length can describe
pub const MAX_VALUE_LEN: usize = 99;

/// Encodes `value` under `id`.
///
/// Callers keep `value` under [MAX_VALUE_LEN] bytes and skip empty optional
/// fields instead of emitting a zero length field.
pub fn field(id: &str, value: &str) -> String {
    debug_assert!(value.len() <= MAX_VALUE_LEN, "field {id} overflows");
    format!("{id}{len:02}{value}", len = value.len())
}

/// Encodes `value` under `id` only when it is not empty.
pub fn optional_field(id: &str, value: &str) -> Option<String> {
    (!value.is_empty()).then(|| field(id, value))
}

/// A field borrowed from a parsed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field<'a> {
    pub id: &'a str,
    pub value: &'a str,
}

/// Splits `data` into its sequence of fields.
///
/// Fails with [PixDecodeError::Malformed] carrying the offset of the first
/// field that does not have a numeric length or runs past the end.
pub fn parse_fields(data: &str) -> Result<Vec<Field<'_>>, PixDecodeError> {
    let mut fields = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let id = data
            .get(offset..offset + ID_LEN)
            .filter(|id| id.bytes().all(|b| b.is_ascii_digit()))
            .ok_or(PixDecodeError::Malformed(offset))?;

        let len = data
            .get(offset + ID_LEN..offset + HEADER_LEN)
            .filter(|len| len.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|len| len.parse::<usize>().ok())
            .ok_or(PixDecodeError::Malformed(offset))?;

        let value_start = offset + HEADER_LEN;
        let value = data
            .get(value_start..value_start + len)
            .ok_or(PixDecodeError::Malformed(offset))?;

        fields.push(Field { id, value });
        offset = value_start + len;
    }

    Ok(fields)
}

/// Value of the first field with `id`.
pub fn find<'a>(fields: &[Field<'a>], id: &str) -> Option<&'a str> {
    fields.iter().find(|f| f.id == id).map(|f| f.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_pads_length() {
        assert_eq!(field("00", "01"), "000201");
        assert_eq!(field("58", "BR"), "5802BR");
        assert_eq!(field("54", "150.00"), "5406150.00");
        assert!(field("26", &"x".repeat(99)).starts_with("2699"));
    }

    #[test]
    fn test_optional_field_skips_empty_values() {
        assert_eq!(optional_field("02", ""), None);
        assert_eq!(optional_field("02", "Mensal"), Some("0206Mensal".to_string()));
    }

    #[test]
    fn test_parse_fields() {
        let fields = parse_fields("0002015802BR6009Sao Paulo").unwrap();
        assert_eq!(
            fields,
            vec![
                Field { id: "00", value: "01" },
                Field { id: "58", value: "BR" },
                Field { id: "60", value: "Sao Paulo" },
            ]
        );
        assert_eq!(find(&fields, "60"), Some("Sao Paulo"));
        assert_eq!(find(&fields, "54"), None);
    }

    #[test]
    fn test_parse_fields_rejects_broken_input() {
        // value runs past the end
        assert_eq!(parse_fields("0005ab"), Err(PixDecodeError::Malformed(0)));
        // non numeric length on the second field
        assert_eq!(parse_fields("00020158xxBR"), Err(PixDecodeError::Malformed(6)));
        // dangling id
        assert_eq!(parse_fields("0002015"), Err(PixDecodeError::Malformed(6)));
    }

    #[test]
    fn test_parse_fields_empty_input() {
        assert!(parse_fields("").unwrap().is_empty());
    }
}
