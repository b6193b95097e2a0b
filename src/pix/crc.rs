//! CRC-16/CCITT-FALSE as required by the BR Code trailing `63` field.

const POLYNOMIAL: u16 = 0x1021;
const INITIAL_VALUE: u16 = 0xFFFF;

/// Raw CRC-16/CCITT-FALSE register over `data`.
///
/// MSB-first, no reflection and no final XOR.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    data.iter().fold(INITIAL_VALUE, |register, byte| {
        let mut register = register ^ (u16::from(*byte) << 8);
        for _ in 0..8 {
            register = if register & 0x8000 != 0 {
                (register << 1) ^ POLYNOMIAL
            } else {
                register << 1
            };
        }
        register
    })
}

/// Checksum of `data` as 4 uppercase hex digits, ready to close a payload.
pub fn crc16(data: &str) -> String {
    format!("{:04X}", crc16_ccitt(data.as_bytes()))
}
