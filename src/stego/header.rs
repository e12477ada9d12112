//! Fixed-size embedding header.
//!
//! Layout (32 bytes, always the first 256 embedded bits):
//!
//! | Offset | Length | Meaning                                  |
//! |--------|--------|------------------------------------------|
//! | 0      | 6      | ASCII signature `RAYZIP`                 |
//! | 6      | 4      | payload length, u32 little-endian        |
//! | 10     | 22     | reserved, zero                           |

use super::error::StegoError;

/// ASCII signature at the start of every header.
pub const HEADER_SIGNATURE: &[u8; 6] = b"RAYZIP";

/// Total header size in bytes.
pub const HEADER_SIZE: usize = 32;

/// Header size in embedded bits.
pub const HEADER_BITS: usize = HEADER_SIZE * 8;

const LENGTH_OFFSET: usize = HEADER_SIGNATURE.len();

/// Decoded embedding header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of payload bytes that follow the header.
    pub payload_len: u32,
}

impl Header {
    /// Creates a header declaring `payload_len` bytes of payload.
    pub fn new(payload_len: u32) -> Self {
        Self { payload_len }
    }

    /// Serializes the header. Reserved bytes are zero.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..LENGTH_OFFSET].copy_from_slice(HEADER_SIGNATURE);
        bytes[LENGTH_OFFSET..LENGTH_OFFSET + 4].copy_from_slice(&self.payload_len.to_le_bytes());
        bytes
    }

    /// Parses a header, accepting declared lengths in `1..=max_payload`.
    ///
    /// Reserved bytes are ignored.
    pub fn parse(bytes: &[u8; HEADER_SIZE], max_payload: u32) -> Result<Self, StegoError> {
        if &bytes[..LENGTH_OFFSET] != HEADER_SIGNATURE {
            return Err(StegoError::InvalidSignature);
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&bytes[LENGTH_OFFSET..LENGTH_OFFSET + 4]);
        let payload_len = u32::from_le_bytes(len_bytes);

        if payload_len == 0 || payload_len > max_payload {
            return Err(StegoError::InvalidDeclaredSize {
                size: payload_len,
                max: max_payload,
            });
        }

        Ok(Self { payload_len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let bytes = Header::new(0x0403_0201).to_bytes();
        assert_eq!(&bytes[..6], b"RAYZIP");
        assert_eq!(&bytes[6..10], &[0x01, 0x02, 0x03, 0x04]);
        assert!(bytes[10..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_reads_declared_length() {
        let bytes = Header::new(3718).to_bytes();
        let header = Header::parse(&bytes, 50 * 1024 * 1024).unwrap();
        assert_eq!(header.payload_len, 3718);
    }

    #[test]
    fn test_parse_rejects_altered_signature() {
        let mut bytes = Header::new(10).to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            Header::parse(&bytes, 100),
            Err(StegoError::InvalidSignature)
        ));
    }

    #[test]
    fn test_parse_rejects_zero_length() {
        let bytes = Header::new(0).to_bytes();
        assert!(matches!(
            Header::parse(&bytes, 100),
            Err(StegoError::InvalidDeclaredSize { size: 0, max: 100 })
        ));
    }

    #[test]
    fn test_parse_rejects_length_over_maximum() {
        let bytes = Header::new(101).to_bytes();
        assert!(matches!(
            Header::parse(&bytes, 100),
            Err(StegoError::InvalidDeclaredSize { size: 101, .. })
        ));
    }

    #[test]
    fn test_high_bit_length_is_unsigned() {
        // Top byte 0x80 must not sign-extend into a negative length.
        let bytes = Header::new(0x8000_0001).to_bytes();
        assert_eq!(bytes[9], 0x80);
        let header = Header::parse(&bytes, u32::MAX).unwrap();
        assert_eq!(header.payload_len, 2_147_483_649);
    }

    #[test]
    fn test_reserved_bytes_ignored_on_parse() {
        let mut bytes = Header::new(5).to_bytes();
        bytes[31] = 0xFF;
        assert_eq!(Header::parse(&bytes, 100).unwrap().payload_len, 5);
    }
}
