//! Identifier pattern codec
//!
//! A 3-byte identifier payload is interleaved with five fixed separator
//! bytes to form the 8-byte mark that gets written into a carrier stream:
//!
//! ```text
//! index   0    1     2    3    4     5    6    7
//! byte    6b   p[0]  7d   e8   p[1]  b4   17   p[2]
//! ```

use crate::error::{PdfMarkError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

pub const PAYLOAD_LEN: usize = 3;
pub const PATTERN_LEN: usize = 8;

const MARKER: u8 = 0x6B;
const SEPARATORS: [u8; 4] = [0x7D, 0xE8, 0xB4, 0x17];

/// Caller-supplied identifier, exactly three raw bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Payload([u8; PAYLOAD_LEN]);

impl Payload {
    pub fn new(bytes: [u8; PAYLOAD_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PAYLOAD_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Payload {
    type Error = PdfMarkError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        let array: [u8; PAYLOAD_LEN] =
            bytes.try_into().map_err(|_| PdfMarkError::InvalidPayloadLength {
                expected: PAYLOAD_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }
}

impl FromStr for Payload {
    type Err = PdfMarkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::try_from(s.as_bytes())
    }
}

/// The 8-byte mark derived from a [`Payload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pattern([u8; PATTERN_LEN]);

impl Pattern {
    pub fn from_payload(payload: Payload) -> Self {
        let [a, b, c] = payload.0;
        let [s0, s1, s2, s3] = SEPARATORS;
        Self([MARKER, a, s0, s1, b, s2, s3, c])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        PATTERN_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Printable ASCII rendering, with `.` for anything outside 0x20..=0x7E.
    pub fn ascii_preview(&self) -> String {
        self.0
            .iter()
            .map(|&b| {
                if (0x20..=0x7E).contains(&b) {
                    b as char
                } else {
                    '.'
                }
            })
            .collect()
    }
}

impl AsRef<[u8]> for Pattern {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, b) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Build the pattern for an untyped payload slice.
///
/// Fails with [`PdfMarkError::InvalidPayloadLength`] unless `payload` is
/// exactly three bytes long.
pub fn build_pattern(payload: &[u8]) -> Result<Pattern> {
    Payload::try_from(payload).map(Pattern::from_payload)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: fixed positions never depend on the payload
        #[test]
        fn fixed_bytes_are_constant(payload in any::<[u8; 3]>()) {
            let pattern = Pattern::from_payload(Payload::new(payload));
            let bytes = pattern.as_bytes();
            prop_assert_eq!(bytes.len(), PATTERN_LEN);
            prop_assert_eq!(bytes[0], 0x6B);
            prop_assert_eq!(bytes[2], 0x7D);
            prop_assert_eq!(bytes[3], 0xE8);
            prop_assert_eq!(bytes[5], 0xB4);
            prop_assert_eq!(bytes[6], 0x17);
        }

        /// Property: payload bytes land at 1, 4 and 7 in order
        #[test]
        fn payload_bytes_are_interleaved(payload in any::<[u8; 3]>()) {
            let pattern = build_pattern(&payload).unwrap();
            let bytes = pattern.as_bytes();
            prop_assert_eq!([bytes[1], bytes[4], bytes[7]], payload);
        }

        /// Property: any slice that is not 3 bytes long is rejected
        #[test]
        fn non_three_byte_payloads_fail(
            payload in prop::collection::vec(any::<u8>(), 0..16)
                .prop_filter("length must differ from 3", |v| v.len() != 3)
        ) {
            prop_assert!(build_pattern(&payload).is_err());
        }
    }
}
