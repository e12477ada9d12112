//! Classification of extracted payloads as ZIP archives.
//!
//! Only the leading 4-byte signature is checked; the archive's internal
//! structure is never parsed. When the signature is missing,
//! [`ArchiveValidator`] tries a short fixed list of [`Correction`]s, each
//! at most once, and accepts the first one that yields a known signature.

use log::{debug, warn};

use super::error::StegoError;

/// Local file header, the usual first record of a ZIP archive.
pub const LOCAL_FILE_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory record, first record of an empty archive.
pub const EMPTY_ARCHIVE: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];
/// Data descriptor marker leading a spanned archive.
pub const SPANNED_ARCHIVE: [u8; 4] = [0x50, 0x4B, 0x07, 0x08];

/// Recognized archive variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    LocalFile,
    Empty,
    Spanned,
}

impl ArchiveKind {
    /// Detects the archive variant from the first four bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        let leading: [u8; 4] = data.get(..4)?.try_into().ok()?;
        match leading {
            LOCAL_FILE_HEADER => Some(Self::LocalFile),
            EMPTY_ARCHIVE => Some(Self::Empty),
            SPANNED_ARCHIVE => Some(Self::Spanned),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LocalFile => "ZIP archive",
            Self::Empty => "empty ZIP archive",
            Self::Spanned => "spanned ZIP archive",
        }
    }
}

/// A bounded repair applied to a payload whose signature was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    /// Drop the first `n` bytes.
    DropLeading(usize),
    /// Insert `n` zero bytes at the front.
    PadLeading(usize),
    /// Insert the local file header signature at the front.
    PrependSignature,
}

/// Corrections in the order they are attempted.
pub const CORRECTIONS: [Correction; 5] = [
    Correction::DropLeading(2),
    Correction::DropLeading(1),
    Correction::PadLeading(1),
    Correction::PadLeading(2),
    Correction::PrependSignature,
];

impl Correction {
    /// Applies the correction, or `None` when it does not apply to `data`.
    pub fn apply(&self, data: &[u8]) -> Option<Vec<u8>> {
        match *self {
            Self::DropLeading(n) => {
                if data.len() <= n {
                    return None;
                }
                Some(data[n..].to_vec())
            }
            Self::PadLeading(n) => {
                let mut fixed = vec![0u8; n];
                fixed.extend_from_slice(data);
                Some(fixed)
            }
            Self::PrependSignature => {
                if data.len() <= 4 || data[0] == LOCAL_FILE_HEADER[0] {
                    return None;
                }
                let mut fixed = Vec::with_capacity(data.len() + 4);
                fixed.extend_from_slice(&LOCAL_FILE_HEADER);
                fixed.extend_from_slice(data);
                Some(fixed)
            }
        }
    }
}

/// An accepted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayload {
    pub data: Vec<u8>,
    /// `None` when the validator does not inspect signatures.
    pub kind: Option<ArchiveKind>,
    /// The repair that made the payload valid, if one was needed.
    pub correction: Option<Correction>,
}

/// Decides whether extracted bytes are an acceptable payload.
pub trait PayloadValidator {
    fn validate(&self, data: Vec<u8>) -> Result<ValidatedPayload, StegoError>;
}

/// Accepts any payload unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl PayloadValidator for AcceptAll {
    fn validate(&self, data: Vec<u8>) -> Result<ValidatedPayload, StegoError> {
        Ok(ValidatedPayload {
            data,
            kind: None,
            correction: None,
        })
    }
}

/// Requires a ZIP signature, optionally repairing the payload.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveValidator {
    auto_correct: bool,
}

impl Default for ArchiveValidator {
    fn default() -> Self {
        Self { auto_correct: true }
    }
}

impl ArchiveValidator {
    pub fn new(auto_correct: bool) -> Self {
        Self { auto_correct }
    }
}

impl PayloadValidator for ArchiveValidator {
    fn validate(&self, data: Vec<u8>) -> Result<ValidatedPayload, StegoError> {
        if data.len() < 4 {
            return Err(corrupt(&data));
        }

        if let Some(kind) = ArchiveKind::detect(&data) {
            debug!("payload recognized as {}", kind.name());
            return Ok(ValidatedPayload {
                data,
                kind: Some(kind),
                correction: None,
            });
        }

        warn!("ZIP signature not found, leading bytes: {}", leading_hex(&data));

        if self.auto_correct {
            for correction in CORRECTIONS {
                let Some(fixed) = correction.apply(&data) else {
                    continue;
                };
                if let Some(kind) = ArchiveKind::detect(&fixed) {
                    warn!("payload auto-corrected with {:?}", correction);
                    return Ok(ValidatedPayload {
                        data: fixed,
                        kind: Some(kind),
                        correction: Some(correction),
                    });
                }
            }
        }

        Err(corrupt(&data))
    }
}

fn corrupt(data: &[u8]) -> StegoError {
    StegoError::CorruptPayload {
        leading: leading_hex(data),
    }
}

fn leading_hex(data: &[u8]) -> String {
    data.iter()
        .take(8)
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zip_like(signature: [u8; 4]) -> Vec<u8> {
        let mut data = signature.to_vec();
        data.extend_from_slice(&[0x14, 0x00, 0x00, 0x00, 0x08, 0x00]);
        data
    }

    #[test]
    fn test_detects_all_signatures() {
        assert_eq!(
            ArchiveKind::detect(&zip_like(LOCAL_FILE_HEADER)),
            Some(ArchiveKind::LocalFile)
        );
        assert_eq!(
            ArchiveKind::detect(&zip_like(EMPTY_ARCHIVE)),
            Some(ArchiveKind::Empty)
        );
        assert_eq!(
            ArchiveKind::detect(&zip_like(SPANNED_ARCHIVE)),
            Some(ArchiveKind::Spanned)
        );
        assert_eq!(ArchiveKind::detect(b"PK"), None);
        assert_eq!(ArchiveKind::detect(b"GIF89a"), None);
    }

    #[test]
    fn test_valid_payload_passes_unchanged() {
        let data = zip_like(LOCAL_FILE_HEADER);
        let validated = ArchiveValidator::default().validate(data.clone()).unwrap();
        assert_eq!(validated.data, data);
        assert_eq!(validated.correction, None);
    }

    #[test]
    fn test_missing_signature_is_prepended() {
        let data = zip_like(LOCAL_FILE_HEADER)[4..].to_vec();
        let validated = ArchiveValidator::default().validate(data.clone()).unwrap();
        assert_eq!(validated.correction, Some(Correction::PrependSignature));
        assert_eq!(validated.kind, Some(ArchiveKind::LocalFile));
        assert_eq!(&validated.data[..4], &LOCAL_FILE_HEADER);
        assert_eq!(&validated.data[4..], &data[..]);
    }

    #[test]
    fn test_leading_garbage_is_dropped() {
        let mut data = vec![0xAA];
        data.extend(zip_like(EMPTY_ARCHIVE));
        let validated = ArchiveValidator::default().validate(data).unwrap();
        assert_eq!(validated.correction, Some(Correction::DropLeading(1)));
        assert_eq!(validated.kind, Some(ArchiveKind::Empty));

        let mut data = vec![0xAA, 0xBB];
        data.extend(zip_like(SPANNED_ARCHIVE));
        let validated = ArchiveValidator::default().validate(data).unwrap();
        assert_eq!(validated.correction, Some(Correction::DropLeading(2)));
    }

    #[test]
    fn test_unrecoverable_payload_is_corrupt() {
        // Starts with 'P' so the signature is never prepended.
        let data = vec![0x50, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            ArchiveValidator::default().validate(data),
            Err(StegoError::CorruptPayload { .. })
        ));
    }

    #[test]
    fn test_short_payload_is_corrupt() {
        assert!(matches!(
            ArchiveValidator::default().validate(vec![0x50, 0x4B, 0x03]),
            Err(StegoError::CorruptPayload { .. })
        ));
        // Four bytes is too short for the prepend repair.
        assert!(matches!(
            ArchiveValidator::default().validate(b"abcd".to_vec()),
            Err(StegoError::CorruptPayload { .. })
        ));
    }

    #[test]
    fn test_auto_correct_can_be_disabled() {
        let data = zip_like(LOCAL_FILE_HEADER)[4..].to_vec();
        assert!(matches!(
            ArchiveValidator::new(false).validate(data),
            Err(StegoError::CorruptPayload { .. })
        ));
    }

    #[test]
    fn test_accept_all_keeps_bytes() {
        let validated = AcceptAll.validate(vec![1, 2, 3]).unwrap();
        assert_eq!(validated.data, vec![1, 2, 3]);
        assert_eq!(validated.kind, None);
    }

    #[test]
    fn test_corrupt_message_lists_leading_bytes() {
        let err = ArchiveValidator::new(false)
            .validate(vec![0xde, 0xad, 0xbe, 0xef, 0x01])
            .unwrap_err();
        assert!(err.to_string().contains("de ad be ef 01"));
    }
}
